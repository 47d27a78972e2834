//! Durable Key-Value Store Module
//!
//! The persisted layer underneath the cache: plain string records addressed
//! by string keys, surviving process restarts when backed by [`FileStore`].

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::StoreError;

// == Key-Value Store ==
/// Per-device string storage consulted by the cache codec.
///
/// Implementations use interior mutability so a single store can be shared
/// (behind an `Arc`) between the facade and every controller bound to it.
/// A later write always wins; there is no versioning.
pub trait KeyValueStore: Send + Sync {
    /// Returns the raw record for `key`, or `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrites the record for `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes the record for `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Enumerates every key currently held.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}
