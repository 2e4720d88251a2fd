//! Error types for the logging subsystem
//!
//! None of these ever reach the code that calls a log method. They travel
//! between formatters, sinks and the dispatcher, which turns them into
//! fallbacks, warnings or PRINT records.

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration value; the default was used instead
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// File sink error with path
    #[error("File sink error for '{path}': {message}")]
    FileSinkError { path: String, message: String },

    /// Formatter error with format name
    #[error("Formatter error ({format_type}): {message}")]
    FormatterError {
        format_type: String,
        message: String,
    },

    /// Remote delivery failed after the attempts were used up or on a terminal status
    #[error("Failed to send log to remote server after {attempts} attempt(s) to {url}: {message}")]
    RemoteDelivery {
        url: String,
        attempts: u32,
        terminal: bool,
        message: String,
    },

    /// Record store rejected a document
    #[error("Database sink error ({collection}): {message}")]
    DatabaseError { collection: String, message: String },

    /// A sink panicked while handling a record
    #[error("Sink '{sink}' panicked: {message}")]
    SinkPanicked { sink: String, message: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file sink error
    pub fn file_sink(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileSinkError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a formatter error
    pub fn formatter(format_type: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FormatterError {
            format_type: format_type.into(),
            message: message.into(),
        }
    }

    /// Create a remote delivery error
    pub fn remote(
        url: impl Into<String>,
        attempts: u32,
        terminal: bool,
        message: impl Into<String>,
    ) -> Self {
        LoggerError::RemoteDelivery {
            url: url.into(),
            attempts,
            terminal,
            message: message.into(),
        }
    }

    /// Create a database sink error
    pub fn database(collection: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::DatabaseError {
            collection: collection.into(),
            message: message.into(),
        }
    }

    /// Create a sink panic error
    pub fn sink_panicked(sink: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::SinkPanicked {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::database("logs", "duplicate key");
        assert!(matches!(err, LoggerError::DatabaseError { .. }));

        let err = LoggerError::config("LOG_DAYS", "not a number");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::file_sink("/var/log/2025-01-08.log", "Permission denied");
        assert!(matches!(err, LoggerError::FileSinkError { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::sink_panicked("file", "boom");
        assert_eq!(err.to_string(), "Sink 'file' panicked: boom");

        let err = LoggerError::formatter("xml", "illegal character U+0001");
        assert_eq!(
            err.to_string(),
            "Formatter error (xml): illegal character U+0001"
        );

        let err = LoggerError::remote("http://127.0.0.1/debug/log", 3, false, "status 500");
        assert_eq!(
            err.to_string(),
            "Failed to send log to remote server after 3 attempt(s) to http://127.0.0.1/debug/log: status 500"
        );
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("opening log file", "cannot open", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("opening log file"));
        assert!(err.to_string().contains("cannot open"));
    }
}
