//! File sink with date-based naming and retention

use super::retention::{cleanup, RotationChannel};
use super::Sink;
use crate::core::config::DEFAULT_RETENTION_DAYS;
use crate::core::{LogRecord, LoggerError, Result};
use crate::formatters::{FormatOptions, LogFormat};
use chrono::{Local, NaiveDate};
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends one formatted record per line to `<dir>/<channel file name>`
///
/// The file is opened, locked, written and closed on every record, so
/// several workers (or processes) can share one directory.
///
/// # Example
///
/// ```no_run
/// use sink_logger::formatters::{FormatOptions, LogFormat};
/// use sink_logger::sinks::{FileSink, RotationChannel};
///
/// let sink = FileSink::new("/var/log/app")
///     .with_channel(RotationChannel::Weekly)
///     .with_retention_days(30)
///     .with_format(LogFormat::Csv, FormatOptions::default());
/// ```
pub struct FileSink {
    dir: PathBuf,
    channel: RotationChannel,
    retention_days: u32,
    format: LogFormat,
    options: FormatOptions,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            channel: RotationChannel::default(),
            retention_days: DEFAULT_RETENTION_DAYS,
            format: LogFormat::default(),
            options: FormatOptions::default(),
        }
    }

    #[must_use]
    pub fn with_channel(mut self, channel: RotationChannel) -> Self {
        self.channel = channel;
        self
    }

    /// `0` disables cleanup
    #[must_use]
    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat, options: FormatOptions) -> Self {
        self.format = format;
        self.options = options;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the next record goes to
    pub fn current_path(&self) -> PathBuf {
        self.path_for(Local::now().date_naive())
    }

    fn path_for(&self, today: NaiveDate) -> PathBuf {
        self.dir.join(self.channel.file_name(today))
    }

    /// Write `record` as if the local date were `today`
    ///
    /// A failed retention sweep never costs the record: it is appended
    /// first and the cleanup error is returned afterwards.
    pub fn write_on(&self, record: &LogRecord, today: NaiveDate) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            LoggerError::file_sink(
                self.dir.display().to_string(),
                format!("Failed to create log directory: {}", e),
            )
        })?;

        let swept = cleanup(&self.dir, self.channel, self.retention_days, today);

        let path = self.path_for(today);
        let mut line = self.format.format(record, &self.options);
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::file_sink(
                    path.display().to_string(),
                    format!("Failed to open log file: {}", e),
                )
            })?;

        file.lock_exclusive().map_err(|e| {
            LoggerError::file_sink(
                path.display().to_string(),
                format!("Failed to lock log file: {}", e),
            )
        })?;

        let written = file.write_all(line.as_bytes());
        let _ = file.unlock();

        written.map_err(|e| {
            LoggerError::file_sink(
                path.display().to_string(),
                format!("Failed to write log record: {}", e),
            )
        })?;

        swept.map(|_| ()).map_err(|e| {
            LoggerError::file_sink(
                self.dir.display().to_string(),
                format!("Record written, but retention cleanup failed: {}", e),
            )
        })
    }
}

impl Sink for FileSink {
    fn write(&self, record: &LogRecord) -> Result<()> {
        self.write_on(record, Local::now().date_naive())
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FieldFlags, Fields, LogLevel};
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_appends_one_line_per_record() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let sink = FileSink::new(dir.path().join("nested/logs"));
        let today = date(2025, 1, 8);

        sink.write_on(&LogRecord::new(LogLevel::Info, "first"), today).unwrap();
        sink.write_on(&LogRecord::new(LogLevel::Error, "second"), today).unwrap();

        let content = fs::read_to_string(dir.path().join("nested/logs/2025-01-08.log")).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"level":"INFO","message":"first"}"#);
        assert!(lines[1].contains("\"second\""));
    }

    #[test]
    fn test_write_runs_retention() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(dir.path().join("2024-12-01.log"), "old\n").unwrap();
        fs::write(dir.path().join("2025-01-07.log"), "recent\n").unwrap();

        let sink = FileSink::new(dir.path()).with_retention_days(7);
        sink.write_on(&LogRecord::new(LogLevel::Info, "x"), date(2025, 1, 8)).unwrap();

        assert!(!dir.path().join("2024-12-01.log").exists());
        assert!(dir.path().join("2025-01-07.log").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_stuck_expired_file_does_not_block_write() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(dir.path().join("2025-01-08.log"), "earlier\n").unwrap();
        fs::write(dir.path().join("2024-01-01.log"), "expired\n").unwrap();
        // Existing files stay writable, but nothing can be unlinked
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o555)).unwrap();

        let sink = FileSink::new(dir.path()).with_retention_days(7);
        let result = sink.write_on(&LogRecord::new(LogLevel::Info, "kept"), date(2025, 1, 8));
        let stuck = dir.path().join("2024-01-01.log").exists();
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o755)).unwrap();

        let content = fs::read_to_string(dir.path().join("2025-01-08.log")).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("\"kept\""));

        if stuck {
            let err = result.unwrap_err();
            assert!(matches!(err, LoggerError::FileSinkError { .. }));
            assert!(err.to_string().contains("retention cleanup failed"), "{}", err);
        } else {
            result.unwrap();
        }
    }

    #[test]
    fn test_default_retention_matches_config() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let today = date(2025, 3, 20);
        let edge = today - chrono::Days::new(u64::from(DEFAULT_RETENTION_DAYS));
        let past = edge - chrono::Days::new(1);
        for day in [edge, past] {
            fs::write(dir.path().join(RotationChannel::Daily.file_name(day)), "x\n").unwrap();
        }

        FileSink::new(dir.path()).write_on(&LogRecord::new(LogLevel::Info, "x"), today).unwrap();
        assert!(dir.path().join(RotationChannel::Daily.file_name(edge)).exists());
        assert!(!dir.path().join(RotationChannel::Daily.file_name(past)).exists());
    }

    #[test]
    fn test_configured_format() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let sink = FileSink::new(dir.path())
            .with_channel(RotationChannel::Single)
            .with_format(
                LogFormat::Csv,
                FormatOptions::new(FieldFlags::PREFIX | FieldFlags::CONTEXT)
                    .with_csv_delimiter(','),
            );
        let record = LogRecord::new(LogLevel::Warning, "low disk")
            .with_context(Fields::new().with("pct", 91));
        sink.write(&record).unwrap();

        let content = fs::read_to_string(dir.path().join("output.log")).unwrap();
        assert!(content.starts_with("WARNING,low disk,"));
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_unwritable_directory_is_an_error() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        let sink = FileSink::new(blocker.join("logs"));
        let err = sink.write(&LogRecord::new(LogLevel::Info, "x")).unwrap_err();
        assert!(matches!(err, LoggerError::FileSinkError { .. }));
    }
}
