//! Log level definitions
//!
//! Levels follow syslog severity with two extras at the ends: `Off` disables
//! everything and `Print` is an always-on console diagnostic.

use super::overflow_policy::LogPriority;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LogLevel {
    Off = 0,
    Emergency = 1,
    Alert = 2,
    Critical = 3,
    Error = 4,
    Warning = 5,
    Notice = 6,
    Info = 7,
    #[default]
    Debug = 8,
    Print = 9,
}

impl LogLevel {
    /// Every level in ascending order
    pub const ALL: [LogLevel; 10] = [
        LogLevel::Off,
        LogLevel::Emergency,
        LogLevel::Alert,
        LogLevel::Critical,
        LogLevel::Error,
        LogLevel::Warning,
        LogLevel::Notice,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Print,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "OFF",
            LogLevel::Emergency => "EMERGENCY",
            LogLevel::Alert => "ALERT",
            LogLevel::Critical => "CRITICAL",
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARNING",
            LogLevel::Notice => "NOTICE",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Print => "PRINT",
        }
    }

    /// Numeric severity, 0 (OFF) through 9 (PRINT)
    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Whether a record at `level` passes a logger configured at `self`.
    ///
    /// PRINT passes unconditionally, including when the logger is OFF.
    #[inline]
    pub fn enables(self, level: LogLevel) -> bool {
        level == LogLevel::Print || (level != LogLevel::Off && self >= level)
    }

    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Emergency => BrightRed,
            LogLevel::Alert => BrightMagenta,
            LogLevel::Critical => Magenta,
            LogLevel::Error => Red,
            LogLevel::Warning => Yellow,
            LogLevel::Notice => BrightGreen,
            LogLevel::Info => Blue,
            LogLevel::Debug => Cyan,
            LogLevel::Print | LogLevel::Off => BrightBlack,
        }
    }

    /// Queue overflow priority; severe records are never dropped
    pub fn priority(&self) -> LogPriority {
        match self {
            LogLevel::Emergency | LogLevel::Alert | LogLevel::Critical | LogLevel::Error => {
                LogPriority::Critical
            }
            LogLevel::Warning | LogLevel::Notice => LogPriority::High,
            _ => LogPriority::Normal,
        }
    }

    /// Levels routed to stderr by the console sink
    #[inline]
    pub fn is_severe(&self) -> bool {
        matches!(
            self,
            LogLevel::Emergency | LogLevel::Alert | LogLevel::Critical | LogLevel::Error
        )
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(n) = trimmed.parse::<u8>() {
            return Self::from_u8(n).ok_or_else(|| format!("Invalid log level: '{}'", s));
        }
        match trimmed.to_uppercase().as_str() {
            "OFF" => Ok(LogLevel::Off),
            "EMERGENCY" => Ok(LogLevel::Emergency),
            "ALERT" => Ok(LogLevel::Alert),
            "CRITICAL" => Ok(LogLevel::Critical),
            "ERROR" => Ok(LogLevel::Error),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "NOTICE" => Ok(LogLevel::Notice),
            "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            "PRINT" => Ok(LogLevel::Print),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

impl Serialize for LogLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.to_str())
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
