//! In-memory store, used as a test double and for ephemeral sessions.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::KeyValueStore;
use crate::error::StoreError;

// == Memory Store ==
/// `HashMap`-backed store with an optional byte quota.
///
/// The quota counts key and value bytes of every record, mimicking the
/// capacity limit of browser-style local storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    /// Creates an empty, unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that rejects writes beyond `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Number of raw records held (values and timestamps counted separately).
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn used_bytes(records: &HashMap<String, String>) -> usize {
        records.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.records.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut records = self.records.write();

        if let Some(quota) = self.quota_bytes {
            let replaced = records.get(key).map(|old| key.len() + old.len()).unwrap_or(0);
            let projected = Self::used_bytes(&records) - replaced + key.len() + value.len();
            if projected > quota {
                return Err(StoreError::QuotaExceeded(format!(
                    "writing '{}' needs {} bytes, quota is {}",
                    key, projected, quota
                )));
            }
        }

        records.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.records.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.records.read().keys().cloned().collect())
    }
}
