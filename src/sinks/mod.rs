//! Output destinations for built records

mod console;
mod database;
mod file;
#[cfg(feature = "remote")]
mod remote;
pub mod retention;

pub use console::ConsoleSink;
pub use database::{DatabaseSink, MemoryStore, RecordStore, StoredLog, DEFAULT_COLLECTION};
pub use file::FileSink;
#[cfg(feature = "remote")]
pub use remote::RemoteSink;
pub use retention::RotationChannel;

use crate::core::{LogRecord, Result};

/// A destination for log records
///
/// Sinks take `&self` so one sink can be shared by every dispatch worker.
/// Implementations serialise their own writes.
pub trait Sink: Send + Sync {
    fn write(&self, record: &LogRecord) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}

impl<S: Sink + ?Sized> Sink for std::sync::Arc<S> {
    fn write(&self, record: &LogRecord) -> Result<()> {
        (**self).write(record)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
