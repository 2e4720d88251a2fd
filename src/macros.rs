//! Logging macros that capture the call site.
//!
//! Each level macro takes the logger, a message template and optional
//! `key = value` context pairs. The file, line and enclosing function are
//! recorded automatically, and the level is checked before the context is
//! evaluated.
//!
//! # Examples
//!
//! ```
//! use sink_logger::prelude::*;
//! use sink_logger::sinks::{DatabaseSink, MemoryStore};
//! use sink_logger::{info, warning};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new());
//! let logger = Logger::builder()
//!     .outputs(OutputMask::DATABASE)
//!     .database(DatabaseSink::new(Arc::clone(&store)))
//!     .build();
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With context, interpolated into the message
//! let port = 8080;
//! info!(logger, "Server listening on port :port", port = port);
//! warning!(logger, "Slow request {path}", path = "/users", ms = 912);
//!
//! let docs = store.documents();
//! assert_eq!(docs[1].1.message, "Server listening on port 8080");
//! assert_eq!(docs[2].1.context["ms"], "912");
//! ```

/// Build [`Fields`](crate::Fields) from `key = value` pairs.
///
/// # Examples
///
/// ```
/// use sink_logger::fields;
///
/// let ctx = fields!(user = "ana", attempts = 3);
/// assert_eq!(ctx.len(), 2);
/// assert_eq!(ctx.get("attempts").map(|v| v.to_string()).as_deref(), Some("3"));
/// assert!(fields!().is_empty());
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($key:ident = $value:expr),+ $(,)?) => {{
        let mut fields = $crate::Fields::new();
        $(fields.push(stringify!($key), $value);)+
        fields
    }};
}

/// Path of the enclosing function, e.g. `my_app::handlers::create_user`.
#[macro_export]
macro_rules! function_path {
    () => {{
        fn __here() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::core::record::clean_function_path(type_name_of(__here))
    }};
}

/// [`CallSite`](crate::CallSite) of the macro invocation.
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::CallSite::new(file!(), line!(), Some($crate::function_path!()))
    };
}

/// Log a message at an explicit level.
///
/// # Examples
///
/// ```
/// # use sink_logger::prelude::*;
/// # let logger = Logger::builder().outputs(OutputMask::empty()).build();
/// use sink_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: :code", code = 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $msg:expr $(, $key:ident = $value:expr)* $(,)?) => {{
        let logger = &$logger;
        let level = $level;
        if logger.enabled(level) {
            logger.log_at(
                level,
                $msg,
                $crate::fields!($($key = $value),*),
                $crate::call_site!(),
            );
        }
    }};
}

/// Log an emergency-level message.
#[macro_export]
macro_rules! emergency {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Emergency, $($arg)+)
    };
}

/// Log an alert-level message.
#[macro_export]
macro_rules! alert {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Alert, $($arg)+)
    };
}

/// Log a critical-level message.
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Critical, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use sink_logger::prelude::*;
/// # let logger = Logger::builder().outputs(OutputMask::empty()).build();
/// use sink_logger::error;
/// error!(logger, "Failed to connect to database");
/// error!(logger, "Connection timeout after :secs seconds", secs = 30);
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warning, $($arg)+)
    };
}

/// Log a notice-level message.
#[macro_export]
macro_rules! notice {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Notice, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Console-only diagnostic, written whatever the level.
///
/// Import it by path (`sink_logger::print`) or call it qualified, since a
/// glob import would shadow the standard `print!`.
#[macro_export]
macro_rules! print {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Print, $($arg)+)
    };
}

/// Dump one or more values to stdout.
///
/// # Examples
///
/// ```
/// # use sink_logger::prelude::*;
/// # let logger = Logger::builder().outputs(OutputMask::empty()).build();
/// use sink_logger::dump;
/// let ids = vec![1, 2, 3];
/// dump!(logger, ids);
/// dump!(logger, ids, "second value");
/// ```
#[macro_export]
macro_rules! dump {
    ($logger:expr, $value:expr $(,)?) => {
        $logger.dump(&$value)
    };
    ($logger:expr, $($value:expr),+ $(,)?) => {
        $logger.dump_many(&[$(&$value as &dyn $crate::dump::Describable),+])
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{LogRecord, Result};
    use crate::sinks::Sink;
    use crate::{FieldFlags, LogLevel, Logger, OutputMask};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<LogRecord>>>);

    impl Sink for Capture {
        fn write(&self, record: &LogRecord) -> Result<()> {
            self.0.lock().push(record.clone());
            Ok(())
        }

        fn name(&self) -> &str {
            "capture"
        }
    }

    fn logger(level: LogLevel) -> (Logger, Capture) {
        let capture = Capture::default();
        let logger = Logger::builder()
            .level(level)
            .flags(FieldFlags::FUNCTION | FieldFlags::LINE | FieldFlags::SHORT_FILE)
            .outputs(OutputMask::FILE)
            .console(capture.clone())
            .file(capture.clone())
            .build();
        (logger, capture)
    }

    #[test]
    fn test_macros_capture_call_site() {
        let (logger, capture) = logger(LogLevel::Debug);
        let line = line!() + 1;
        info!(logger, "user :user", user = "ana");

        let records = capture.0.lock();
        let record = &records[0];
        assert_eq!(record.message, "user ana");
        assert_eq!(record.line, Some(line));
        assert_eq!(record.file.as_deref(), Some("macros.rs"));
        assert_eq!(
            record.function.as_deref(),
            Some("sink_logger::macros::tests::test_macros_capture_call_site")
        );
    }

    #[test]
    fn test_context_not_evaluated_when_disabled() {
        let (logger, capture) = logger(LogLevel::Error);
        let mut evaluated = false;
        debug!(logger, "skipped", value = {
            evaluated = true;
            1
        });

        assert!(!evaluated);
        assert!(capture.0.lock().is_empty());
    }

    #[test]
    fn test_all_level_macros() {
        let (logger, capture) = logger(LogLevel::Debug);
        emergency!(logger, "a");
        alert!(logger, "b");
        critical!(logger, "c");
        error!(logger, "d");
        warning!(logger, "e");
        notice!(logger, "f");
        info!(logger, "g");
        debug!(logger, "h");
        crate::print!(logger, "i");

        let levels: Vec<_> = capture.0.lock().iter().map(|r| r.level).collect();
        assert_eq!(levels, LogLevel::ALL[1..].to_vec());
    }

    #[test]
    fn test_trailing_comma_and_closure_path() {
        let (logger, capture) = logger(LogLevel::Debug);
        let run = || notice!(logger, "n :k", k = 1,);
        run();

        let records = capture.0.lock();
        assert_eq!(records[0].message, "n 1");
        assert_eq!(
            records[0].function.as_deref(),
            Some("sink_logger::macros::tests::test_trailing_comma_and_closure_path")
        );
    }
}
