//! Device-local store persisted as a single JSON document.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::{debug, warn};

use super::KeyValueStore;
use crate::error::StoreError;

// == File Store ==
/// Write-through store backed by a JSON object on disk.
///
/// Records are held in memory and the whole document is rewritten on every
/// mutation (temp file + rename), so a crash never leaves a half-written
/// document behind.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    records: RwLock<HashMap<String, String>>,
}

impl FileStore {
    // == Constructor ==
    /// Opens the store at `path`, creating parent directories as needed.
    ///
    /// A missing file yields an empty store. An unreadable or corrupt
    /// document is logged and replaced by an empty store rather than failing,
    /// since every record in it is only a cache.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let records = match Self::read_document(&path) {
            Ok(records) => records,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Discarding unreadable store document");
                HashMap::new()
            }
        };

        debug!(path = %path.display(), records = records.len(), "Opened file store");

        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    /// Location of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(path: &Path) -> Result<HashMap<String, String>, StoreError> {
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    fn persist(&self, records: &HashMap<String, String>) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(records)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.records.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut records = self.records.write();
        let previous = records.insert(key.to_string(), value.to_string());

        if let Err(e) = self.persist(&records) {
            // Keep memory in line with what is on disk
            match previous {
                Some(old) => records.insert(key.to_string(), old),
                None => records.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut records = self.records.write();
        if records.remove(key).is_none() {
            return Ok(());
        }
        self.persist(&records)
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.records.read().keys().cloned().collect())
    }
}
