//! Core logger types and traits

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod fields;
pub mod flags;
pub mod interpolate;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod overflow_policy;
pub mod record;
pub mod record_id;
pub mod timestamp;

pub use config::{DispatchConfig, FileConfig, LoggerConfig, RemoteConfig, RetryPolicy};
pub use dispatcher::{Dispatcher, SinkSet, SinkSlot};
pub use error::{LoggerError, Result};
pub use fields::{field, Field, FieldValue, Fields};
pub use flags::{FieldFlags, FileStyle, OutputMask};
pub use interpolate::interpolate;
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder, DEFAULT_SHUTDOWN_TIMEOUT};
pub use metrics::{LoggerMetrics, MetricsSnapshot};
pub use overflow_policy::{LogPriority, OverflowCallback, OverflowPolicy};
pub use record::{CallSite, LogRecord, RecordBuilder};
pub use record_id::new_record_id;
pub use timestamp::TimestampFormat;
