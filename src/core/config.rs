//! Logger configuration
//!
//! Configuration is a plain value owned by each [`Logger`](super::Logger).
//! It can be built in code with the `with_*` methods or read from `LOG_*`
//! environment variables. A malformed variable never aborts loading: it is
//! reported as a warning and the default is kept.

use super::error::LoggerError;
use super::flags::{FieldFlags, OutputMask};
use super::log_level::LogLevel;
use super::overflow_policy::OverflowPolicy;
use super::timestamp::TimestampFormat;
use crate::formatters::{LogFormat, DEFAULT_CSV_DELIMITER};
use crate::sinks::RotationChannel;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_RETENTION_DAYS: u32 = 14;
pub const DEFAULT_REMOTE_URL: &str = "http://127.0.0.1/debug/log";
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;
pub const DEFAULT_WORKERS: usize = 2;

/// Backoff schedule for remote delivery
///
/// # Example
///
/// ```
/// use sink_logger::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.delay_before(0), Duration::ZERO);
/// assert_eq!(policy.delay_before(1), Duration::from_secs(1));
/// assert_eq!(policy.delay_before(2), Duration::from_secs(2));
/// assert_eq!(policy.delay_before(6), Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay,
        }
    }

    /// Wait before zero-based attempt `attempt`: nothing for the first one,
    /// then `initial * 2^(attempt - 1)` capped at `max_delay`
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 2u32.saturating_pow(attempt - 1);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileConfig {
    pub dir: PathBuf,
    pub channel: RotationChannel,
    /// `0` disables cleanup
    pub retention_days: u32,
    pub format: LogFormat,
    pub csv_delimiter: char,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_LOG_DIR),
            channel: RotationChannel::Daily,
            retention_days: DEFAULT_RETENTION_DAYS,
            format: LogFormat::Ndjson,
            csv_delimiter: DEFAULT_CSV_DELIMITER,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteConfig {
    pub url: String,
    /// Bearer token; delivery is skipped while empty
    pub token: String,
    /// Per-attempt request timeout
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REMOTE_URL.to_string(),
            token: String::new(),
            timeout: DEFAULT_REMOTE_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchConfig {
    pub queue_capacity: usize,
    pub workers: usize,
    pub overflow_policy: OverflowPolicy,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            workers: DEFAULT_WORKERS,
            overflow_policy: OverflowPolicy::AlertAndDrop,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggerConfig {
    pub level: LogLevel,
    pub flags: FieldFlags,
    pub outputs: OutputMask,
    pub date_format: TimestampFormat,
    pub file: FileConfig,
    pub remote: RemoteConfig,
    pub dispatch: DispatchConfig,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Debug,
            flags: FieldFlags::ALL,
            outputs: OutputMask::CONSOLE | OutputMask::FILE,
            date_format: TimestampFormat::default(),
            file: FileConfig::default(),
            remote: RemoteConfig::default(),
            dispatch: DispatchConfig::default(),
        }
    }
}

impl LoggerConfig {
    /// Read the `LOG_*` variables of the process environment.
    ///
    /// Warnings are printed to stderr.
    pub fn from_env() -> Self {
        let (config, warnings) = Self::from_lookup(|key| std::env::var(key).ok());
        for warning in &warnings {
            eprintln!("[LOGGER WARNING] {}", warning);
        }
        config
    }

    /// Build a configuration from a variable lookup, returning the
    /// configuration and one warning per malformed variable.
    ///
    /// # Example
    ///
    /// ```
    /// use sink_logger::{LoggerConfig, LogLevel};
    ///
    /// let (config, warnings) = LoggerConfig::from_lookup(|key| match key {
    ///     "LOG_LEVEL" => Some("warning".to_string()),
    ///     "LOG_DAYS" => Some("many".to_string()),
    ///     _ => None,
    /// });
    /// assert_eq!(config.level, LogLevel::Warning);
    /// assert_eq!(config.file.retention_days, 14);
    /// assert_eq!(warnings.len(), 1);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> (Self, Vec<LoggerError>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let mut warnings = Vec::new();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = get("LOG_LEVEL") {
            parse_into(&mut config.level, "LOG_LEVEL", &v, &mut warnings);
        }
        if let Some(v) = get("LOG_FLAGS") {
            config.flags = parse_mask(
                "LOG_FLAGS",
                &v,
                config.flags,
                &mut warnings,
                |bits| u32::try_from(bits).ok().map(FieldFlags::from_bits),
                FieldFlags::parse_list,
            );
        }
        if let Some(v) = get("LOG_OUTPUT") {
            config.outputs = parse_mask(
                "LOG_OUTPUT",
                &v,
                config.outputs,
                &mut warnings,
                |bits| u8::try_from(bits).ok().map(OutputMask::from_bits),
                OutputMask::parse_list,
            );
        }
        if let Some(v) = get("LOG_URL") {
            config.remote.url = v;
        }
        if let Some(v) = get("LOG_URL_TOKEN") {
            config.remote.token = v;
        }
        if let Some(v) = get("LOG_PATH") {
            config.file.dir = PathBuf::from(v);
        }
        if let Some(v) = get("LOG_CHANNEL") {
            parse_into(&mut config.file.channel, "LOG_CHANNEL", &v, &mut warnings);
        }
        if let Some(v) = get("LOG_DAYS") {
            parse_into(&mut config.file.retention_days, "LOG_DAYS", &v, &mut warnings);
        }
        if let Some(v) = get("LOG_DATE_FORMAT") {
            match TimestampFormat::parse(&v) {
                Ok(format) => config.date_format = format,
                Err(e) => warnings.push(e),
            }
        }
        if let Some(v) = get("LOG_FILE_FORMAT") {
            parse_into(&mut config.file.format, "LOG_FILE_FORMAT", &v, &mut warnings);
        }
        if let Some(v) = lookup("LOG_CSV_DELIMITER").filter(|v| !v.is_empty()) {
            let mut chars = v.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if !matches!(c, '"' | '\r' | '\n') => {
                    config.file.csv_delimiter = c;
                }
                _ => warnings.push(LoggerError::config(
                    "LOG_CSV_DELIMITER",
                    format!(
                        "expected a single character other than a quote or line break, got '{}'",
                        v
                    ),
                )),
            }
        }
        if let Some(v) = get("LOG_REMOTE_TIMEOUT") {
            let mut secs = config.remote.timeout.as_secs();
            if parse_into(&mut secs, "LOG_REMOTE_TIMEOUT", &v, &mut warnings) {
                config.remote.timeout = Duration::from_secs(secs);
            }
        }
        if let Some(v) = get("LOG_WORKERS") {
            let mut workers = config.dispatch.workers;
            if parse_into(&mut workers, "LOG_WORKERS", &v, &mut warnings) {
                if workers == 0 {
                    warnings.push(LoggerError::config("LOG_WORKERS", "must be at least 1"));
                } else {
                    config.dispatch.workers = workers;
                }
            }
        }
        if let Some(v) = get("LOG_QUEUE_CAPACITY") {
            let mut capacity = config.dispatch.queue_capacity;
            if parse_into(&mut capacity, "LOG_QUEUE_CAPACITY", &v, &mut warnings) {
                if capacity == 0 {
                    warnings.push(LoggerError::config("LOG_QUEUE_CAPACITY", "must be at least 1"));
                } else {
                    config.dispatch.queue_capacity = capacity;
                }
            }
        }
        if let Some(v) = get("LOG_OVERFLOW_POLICY") {
            parse_into(
                &mut config.dispatch.overflow_policy,
                "LOG_OVERFLOW_POLICY",
                &v,
                &mut warnings,
            );
        }

        (config, warnings)
    }

    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: FieldFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_outputs(mut self, outputs: OutputMask) -> Self {
        self.outputs = outputs;
        self
    }

    #[must_use]
    pub fn with_date_format(mut self, format: TimestampFormat) -> Self {
        self.date_format = format;
        self
    }

    #[must_use]
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.file.dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_channel(mut self, channel: RotationChannel) -> Self {
        self.file.channel = channel;
        self
    }

    #[must_use]
    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.file.retention_days = days;
        self
    }

    #[must_use]
    pub fn with_file_format(mut self, format: LogFormat) -> Self {
        self.file.format = format;
        self
    }

    #[must_use]
    pub fn with_csv_delimiter(mut self, delimiter: char) -> Self {
        self.file.csv_delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_remote(mut self, url: impl Into<String>, token: impl Into<String>) -> Self {
        self.remote.url = url.into();
        self.remote.token = token.into();
        self
    }

    #[must_use]
    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.remote.retry = retry;
        self
    }

    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.dispatch.queue_capacity = capacity.max(1);
        self
    }

    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.dispatch.workers = workers.max(1);
        self
    }

    #[must_use]
    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.dispatch.overflow_policy = policy;
        self
    }
}

/// Parse `raw` into `slot`, keeping the old value and recording a warning
/// on failure. Returns whether `slot` was updated.
fn parse_into<T>(slot: &mut T, key: &str, raw: &str, warnings: &mut Vec<LoggerError>) -> bool
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw.parse::<T>() {
        Ok(value) => {
            *slot = value;
            true
        }
        Err(e) => {
            warnings.push(LoggerError::config(key, format!("{} (got '{}')", e, raw)));
            false
        }
    }
}

/// Masks accept either a number or a comma-separated list of names
fn parse_mask<M, B, L>(
    key: &str,
    raw: &str,
    current: M,
    warnings: &mut Vec<LoggerError>,
    from_bits: B,
    parse_list: L,
) -> M
where
    B: Fn(u64) -> Option<M>,
    L: Fn(&str) -> (M, Vec<String>),
{
    if let Ok(bits) = raw.parse::<u64>() {
        return match from_bits(bits) {
            Some(mask) => mask,
            None => {
                warnings.push(LoggerError::config(key, format!("value {} out of range", bits)));
                current
            }
        };
    }
    let (mask, unknown) = parse_list(raw);
    if !unknown.is_empty() {
        warnings.push(LoggerError::config(
            key,
            format!("unknown names ignored: {}", unknown.join(", ")),
        ));
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> (LoggerConfig, Vec<LoggerError>) {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LoggerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = LoggerConfig::default();
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.flags, FieldFlags::ALL);
        assert_eq!(config.outputs, OutputMask::CONSOLE | OutputMask::FILE);
        assert_eq!(config.file.dir, PathBuf::from("logs"));
        assert_eq!(config.file.channel, RotationChannel::Daily);
        assert_eq!(config.file.retention_days, 14);
        assert_eq!(config.file.csv_delimiter, ';');
        assert_eq!(config.remote.url, "http://127.0.0.1/debug/log");
        assert!(config.remote.token.is_empty());
        assert_eq!(config.remote.timeout, Duration::from_secs(10));
        assert_eq!(config.dispatch.workers, 2);
        assert_eq!(config.dispatch.overflow_policy, OverflowPolicy::AlertAndDrop);
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        let (config, warnings) = load(&[]);
        assert_eq!(config, LoggerConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_all_variables() {
        let (config, warnings) = load(&[
            ("LOG_LEVEL", "3"),
            ("LOG_FLAGS", "timestamp,prefix,context"),
            ("LOG_OUTPUT", "15"),
            ("LOG_URL", "https://logs.example.com/in"),
            ("LOG_URL_TOKEN", "s3cret"),
            ("LOG_PATH", "/tmp/app-logs"),
            ("LOG_CHANNEL", "mensual"),
            ("LOG_DAYS", "60"),
            ("LOG_DATE_FORMAT", "rfc3339"),
            ("LOG_FILE_FORMAT", "ltsv"),
            ("LOG_CSV_DELIMITER", ","),
            ("LOG_REMOTE_TIMEOUT", "3"),
            ("LOG_WORKERS", "4"),
            ("LOG_QUEUE_CAPACITY", "64"),
            ("LOG_OVERFLOW_POLICY", "block:250"),
        ]);
        assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
        assert_eq!(config.level, LogLevel::Critical);
        assert_eq!(
            config.flags,
            FieldFlags::TIMESTAMP | FieldFlags::PREFIX | FieldFlags::CONTEXT
        );
        assert_eq!(config.outputs, OutputMask::ALL);
        assert_eq!(config.remote.token, "s3cret");
        assert_eq!(config.file.dir, PathBuf::from("/tmp/app-logs"));
        assert_eq!(config.file.channel, RotationChannel::Monthly);
        assert_eq!(config.file.retention_days, 60);
        assert_eq!(config.date_format, TimestampFormat::Rfc3339);
        assert_eq!(config.file.format, LogFormat::Ltsv);
        assert_eq!(config.file.csv_delimiter, ',');
        assert_eq!(config.remote.timeout, Duration::from_secs(3));
        assert_eq!(config.dispatch.workers, 4);
        assert_eq!(config.dispatch.queue_capacity, 64);
        assert_eq!(
            config.dispatch.overflow_policy,
            OverflowPolicy::BlockWithTimeout(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_malformed_values_warn_and_keep_defaults() {
        let (config, warnings) = load(&[
            ("LOG_LEVEL", "loud"),
            ("LOG_CHANNEL", "hourly"),
            ("LOG_DAYS", "-1"),
            ("LOG_DATE_FORMAT", "%Y-%"),
            ("LOG_CSV_DELIMITER", "ab"),
            ("LOG_WORKERS", "0"),
        ]);
        assert_eq!(warnings.len(), 6);
        assert!(warnings
            .iter()
            .all(|w| matches!(w, LoggerError::InvalidConfiguration { .. })));

        let defaults = LoggerConfig::default();
        assert_eq!(config.level, defaults.level);
        assert_eq!(config.file.channel, RotationChannel::Daily);
        assert_eq!(config.file.retention_days, 14);
        assert_eq!(config.date_format, defaults.date_format);
        assert_eq!(config.file.csv_delimiter, ';');
        assert_eq!(config.dispatch.workers, 2);
    }

    #[test]
    fn test_unknown_flag_names_are_reported() {
        let (config, warnings) = load(&[("LOG_FLAGS", "prefix,sparkles")]);
        assert_eq!(config.flags, FieldFlags::PREFIX);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].to_string().contains("sparkles"));
    }

    #[test]
    fn test_builder_methods() {
        let config = LoggerConfig::default()
            .with_level(LogLevel::Info)
            .with_outputs(OutputMask::FILE)
            .with_log_dir("/srv/logs")
            .with_workers(0)
            .with_retry_policy(RetryPolicy::new(
                5,
                Duration::from_millis(10),
                Duration::from_millis(40),
            ));
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.outputs, OutputMask::FILE);
        assert_eq!(config.dispatch.workers, 1);
        assert_eq!(config.remote.retry.delay_before(4), Duration::from_millis(40));
    }

    #[test]
    fn test_retry_delays() {
        let policy = RetryPolicy::default();
        let delays: Vec<_> = (0..6).map(|n| policy.delay_before(n).as_secs()).collect();
        assert_eq!(delays, [0, 1, 2, 4, 8, 10]);
        assert_eq!(policy.delay_before(u32::MAX), Duration::from_secs(10));
    }
}
