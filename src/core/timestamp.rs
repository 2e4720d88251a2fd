//! Timestamp layouts for the record `time` field
//!
//! Records are stamped in local time using a configurable layout. The named
//! layouts cover the usual machine formats; anything else is a strftime
//! pattern validated up front so a bad pattern is caught at configuration
//! time rather than on every record.

use super::error::{LoggerError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Default layout: `2025-01-08 10:30:45.123456`
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Standardized timestamp format options
///
/// # Examples
///
/// ```
/// use sink_logger::TimestampFormat;
///
/// let format = TimestampFormat::parse("%d/%m/%Y").unwrap();
/// assert_eq!(format, TimestampFormat::Custom("%d/%m/%Y".to_string()));
///
/// assert!(TimestampFormat::parse("%Y-%").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123+01:00`
    Iso8601,

    /// ISO 8601 with microseconds: `2025-01-08T10:30:45.123456+01:00`
    Iso8601Micros,

    /// RFC 3339: `2025-01-08T10:30:45+01:00`
    Rfc3339,

    /// Unix timestamp in seconds: `1736332245`
    Unix,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Unix timestamp in microseconds: `1736332245123456`
    UnixMicros,

    /// strftime pattern
    Custom(String),
}

impl Default for TimestampFormat {
    fn default() -> Self {
        TimestampFormat::Custom(DEFAULT_DATE_FORMAT.to_string())
    }
}

impl TimestampFormat {
    /// Parse a named layout (case-insensitive) or a strftime pattern
    pub fn parse(s: &str) -> Result<Self> {
        let named = match s.trim().to_lowercase().as_str() {
            "iso8601" => Some(TimestampFormat::Iso8601),
            "iso8601micros" => Some(TimestampFormat::Iso8601Micros),
            "rfc3339" => Some(TimestampFormat::Rfc3339),
            "unix" => Some(TimestampFormat::Unix),
            "unixmillis" => Some(TimestampFormat::UnixMillis),
            "unixmicros" => Some(TimestampFormat::UnixMicros),
            _ => None,
        };
        if let Some(format) = named {
            return Ok(format);
        }
        if s.is_empty() {
            return Err(LoggerError::config("LOG_DATE_FORMAT", "empty layout"));
        }
        if StrftimeItems::new(s).any(|item| matches!(item, Item::Error)) {
            return Err(LoggerError::config(
                "LOG_DATE_FORMAT",
                format!("invalid strftime layout '{}'", s),
            ));
        }
        Ok(TimestampFormat::Custom(s.to_string()))
    }

    #[must_use]
    pub fn format<Tz>(&self, datetime: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        match self {
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string(),
            TimestampFormat::Iso8601Micros => {
                datetime.format("%Y-%m-%dT%H:%M:%S%.6f%:z").to_string()
            }
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::UnixMicros => datetime.timestamp_micros().to_string(),
            TimestampFormat::Custom(pattern) => datetime.format(pattern).to_string(),
        }
    }

    /// Format the current local time
    #[must_use]
    pub fn now(&self) -> String {
        self.format(&Local::now())
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TimestampFormat::Unix | TimestampFormat::UnixMillis | TimestampFormat::UnixMicros
        )
    }
}
