//! The record produced by every log call
//!
//! A record is built once on the calling thread, then shared read-only by
//! every sink that receives it.

use super::fields::Fields;
use super::flags::{FieldFlags, FileStyle};
use super::interpolate::interpolate;
use super::log_level::LogLevel;
use super::record_id::new_record_id;
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};
use std::panic::Location;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Fields::is_empty")]
    pub context: Fields,
}

impl LogRecord {
    /// A bare record with no optional fields
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            id: None,
            time: None,
            level,
            message: message.into(),
            function: None,
            line: None,
            file: None,
            context: Fields::new(),
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: Fields) -> Self {
        self.context = context;
        self
    }

    /// `file:line`, `file`, or `line` depending on what is populated
    pub fn location(&self) -> Option<String> {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => Some(format!("{}:{}", file, line)),
            (Some(file), None) => Some(file.clone()),
            (None, Some(line)) => Some(line.to_string()),
            (None, None) => None,
        }
    }
}

/// Where a log call was made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
    pub function: Option<&'static str>,
}

impl CallSite {
    pub const fn new(file: &'static str, line: u32, function: Option<&'static str>) -> Self {
        Self {
            file,
            line,
            function,
        }
    }

    /// Location of the caller of the `#[track_caller]` chain
    ///
    /// `Location` carries no function name, so `function` is always `None`
    /// here. Use [`call_site!`](crate::call_site) (or the logging macros)
    /// when the record should name the enclosing function.
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(location.file(), location.line(), None)
    }

    /// Resolve the file path according to `style`
    pub fn file_as(&self, style: FileStyle) -> String {
        let path = Path::new(self.file);
        match style {
            FileStyle::Long => {
                if path.is_absolute() {
                    self.file.to_string()
                } else {
                    std::env::current_dir()
                        .map(|cwd| cwd.join(path).display().to_string())
                        .unwrap_or_else(|_| self.file.to_string())
                }
            }
            FileStyle::Relative => std::env::current_dir()
                .ok()
                .and_then(|cwd| path.strip_prefix(cwd).ok().map(|p| p.display().to_string()))
                .unwrap_or_else(|| self.file.to_string()),
            FileStyle::Short => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.file.to_string()),
        }
    }
}

/// Trim the helper suffix left by [`function_path!`](crate::function_path)
/// and closure markers from a type path.
#[doc(hidden)]
pub fn clean_function_path(raw: &'static str) -> &'static str {
    let mut name = raw.strip_suffix("::__here").unwrap_or(raw);
    while let Some(stripped) = name.strip_suffix("::{{closure}}") {
        name = stripped;
    }
    name
}

/// Builds records according to the active field flags
#[derive(Debug, Clone)]
pub struct RecordBuilder<'a> {
    flags: FieldFlags,
    timestamp: &'a TimestampFormat,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(flags: FieldFlags, timestamp: &'a TimestampFormat) -> Self {
        Self { flags, timestamp }
    }

    /// Assemble a record. Only fields whose flag is set are populated; the
    /// message is interpolated against `context`.
    pub fn build(
        &self,
        level: LogLevel,
        message: &str,
        context: Fields,
        site: CallSite,
    ) -> LogRecord {
        let flags = self.flags;
        let mut record = LogRecord::new(level, interpolate(message, &context));

        if flags.contains(FieldFlags::ID) {
            record.id = Some(new_record_id());
        }
        if flags.contains(FieldFlags::TIMESTAMP) {
            record.time = Some(self.timestamp.now());
        }
        if flags.contains(FieldFlags::FUNCTION) {
            record.function = site.function.map(str::to_string);
        }
        if flags.contains(FieldFlags::LINE) {
            record.line = Some(site.line);
        }
        if let Some(style) = flags.file_style() {
            record.file = Some(site.file_as(style));
        }

        record.context = context;
        record
    }
}
