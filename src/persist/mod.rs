//! Durable key-value storage for the box record

mod file;
pub mod record;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

pub use file::FileStorage;
pub use record::{decode_record, encode_record, DEFAULT_RECORD_KEY};

/// Errors raised by record storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed box record: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid record key '{0}'")]
    InvalidKey(String),
}

/// Key-value storage holding serialized records by name
pub trait RecordStorage: Send + Sync {
    /// Read a record, `None` when it has never been written
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace a record in full
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Erase a record. Removing a missing record is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process storage; clones share the same entries
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}
