//! Cache Entry Module
//!
//! The logical view of one cached resource: a value plus the time it was
//! captured. Freshness is judged against a ttl supplied at read time, so the
//! same entry may be fresh for one reader and stale for another.

// == Cache Entry ==
/// A decoded cache entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    /// Cache key the entry is stored under
    pub key: String,
    /// The stored value
    pub value: T,
    /// Capture timestamp (Unix milliseconds)
    pub stored_at: u64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    pub fn new(key: impl Into<String>, value: T, stored_at: u64) -> Self {
        Self {
            key: key.into(),
            value,
            stored_at,
        }
    }

    // == Age ==
    /// Milliseconds elapsed since capture.
    ///
    /// A capture time in the future (clock skew) counts as age zero.
    pub fn age_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.stored_at)
    }

    // == Is Fresh ==
    /// Returns `true` while `age < ttl_ms`.
    ///
    /// Boundary condition: once exactly `ttl_ms` has elapsed the entry is
    /// stale.
    pub fn is_fresh(&self, now: u64, ttl_ms: u64) -> bool {
        self.age_ms(now) < ttl_ms
    }

    /// Milliseconds of freshness left under `ttl_ms`, zero once stale.
    pub fn ttl_remaining_ms(&self, now: u64, ttl_ms: u64) -> u64 {
        ttl_ms.saturating_sub(self.age_ms(now))
    }
}
