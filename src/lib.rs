//! # Sink Logger
//!
//! Structured logging with level filtering, placeholder interpolation and
//! fan-out of every record to console, file, database and remote sinks.
//!
//! ## Features
//!
//! - **Structured Records**: Optional id, timestamp, call site and context
//!   fields chosen by [`FieldFlags`]
//! - **Six File Encodings**: NDJSON, CSV, XML, YAML, LTSV and plain text
//! - **Retention**: Daily, weekly and monthly file rotation with cleanup
//! - **Remote Delivery**: HTTP with retry and exponential backoff (feature `remote`)
//! - **Value Dumper**: Nested, type-annotated descriptions of any value
//! - **Worker Pool**: Bounded queue with overflow policies and metrics
//!
//! ## Example
//!
//! ```no_run
//! use sink_logger::prelude::*;
//! use sink_logger::{fields, info};
//!
//! let logger = Logger::from_config(LoggerConfig::from_env());
//! info!(logger, "user :user signed in", user = "ana");
//! logger.error("payment failed", fields!(order = 1182, amount = 12.5));
//! ```

pub mod core;
pub mod dump;
pub mod formatters;
pub mod macros;
pub mod sinks;

pub use crate::core::config;

pub mod prelude {
    pub use crate::core::{
        FieldFlags, FieldValue, Fields, LogLevel, LogPriority, LogRecord, Logger, LoggerBuilder,
        LoggerConfig, LoggerError, LoggerMetrics, OutputMask, OverflowCallback, OverflowPolicy,
        Result, RetryPolicy, TimestampFormat, DEFAULT_SHUTDOWN_TIMEOUT,
    };
    pub use crate::dump::Describable;
    pub use crate::formatters::LogFormat;
    pub use crate::sinks::{RotationChannel, Sink};
}

pub use crate::core::{
    field, interpolate, CallSite, Field, FieldFlags, FieldValue, Fields, LogLevel, LogPriority,
    LogRecord, Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics, OutputMask,
    OverflowCallback, OverflowPolicy, Result, RetryPolicy, TimestampFormat,
    DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use crate::dump::Describable;
