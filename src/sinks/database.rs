//! Database sink
//!
//! The storage layer is an external collaborator: the sink converts each
//! record into a [`StoredLog`] document and hands it to a [`RecordStore`].

use super::Sink;
use crate::core::{LogRecord, LoggerError, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Collection records are written to unless overridden
pub const DEFAULT_COLLECTION: &str = "system_logs";

/// Storage-side shape of a log record
///
/// Every value is text: the level by name, the line as a decimal string and
/// context values by their display form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoredLog {
    pub id: String,
    pub time: String,
    pub level: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub function: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub line: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,
}

impl From<&LogRecord> for StoredLog {
    /// Duplicate context keys collapse to the last value
    fn from(record: &LogRecord) -> Self {
        Self {
            id: record.id.clone().unwrap_or_default(),
            time: record.time.clone().unwrap_or_default(),
            level: record.level.to_str().to_string(),
            message: record.message.clone(),
            function: record.function.clone().unwrap_or_default(),
            line: record.line.map(|l| l.to_string()).unwrap_or_default(),
            file: record.file.clone().unwrap_or_default(),
            context: record
                .context
                .iter()
                .map(|f| (f.key.clone(), f.value.to_string()))
                .collect(),
        }
    }
}

/// Create-record operation of the storage layer
pub trait RecordStore: Send + Sync {
    fn create(&self, collection: &str, doc: &StoredLog) -> Result<()>;
}

/// In-process store, mostly useful in tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<Vec<(String, StoredLog)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents written so far, with their collection
    pub fn documents(&self) -> Vec<(String, StoredLog)> {
        self.docs.lock().clone()
    }
}

impl RecordStore for MemoryStore {
    fn create(&self, collection: &str, doc: &StoredLog) -> Result<()> {
        self.docs.lock().push((collection.to_string(), doc.clone()));
        Ok(())
    }
}

impl<S: RecordStore + ?Sized> RecordStore for std::sync::Arc<S> {
    fn create(&self, collection: &str, doc: &StoredLog) -> Result<()> {
        (**self).create(collection, doc)
    }
}

pub struct DatabaseSink<S: RecordStore> {
    store: S,
    collection: String,
}

impl<S: RecordStore> DatabaseSink<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }

    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: RecordStore> Sink for DatabaseSink<S> {
    /// Store failures are returned, never logged from here
    fn write(&self, record: &LogRecord) -> Result<()> {
        let doc = StoredLog::from(record);
        self.store.create(&self.collection, &doc).map_err(|e| match e {
            e @ LoggerError::DatabaseError { .. } => e,
            other => LoggerError::database(&self.collection, other.to_string()),
        })
    }

    fn name(&self) -> &str {
        "database"
    }
}
