//! Cache Statistics Module
//!
//! Tracks facade read outcomes. Purely observational; nothing in the cache
//! decides anything based on these numbers.

use serde::Serialize;

// == Cache Stats ==
/// Facade read counters plus the persisted entry count.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Reads that returned a fresh value
    pub hits: u64,
    /// Reads that returned nothing (missing, stale, or undecodable)
    pub misses: u64,
    /// Timestamp records currently in the store
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
