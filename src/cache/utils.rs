//! Cache Utility Facade
//!
//! Stateless `get / set / clear / clear_all` over the codec and a shared
//! [`KeyValueStore`]. Usable on its own or underneath a
//! [`CacheController`](crate::cache::CacheController).
//!
//! Nothing here surfaces store or decode failures: reads degrade to `None`,
//! writes degrade to a logged no-op.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::cache::codec::{self, Decoded, DecodeError, TIMESTAMP_SUFFIX};
use crate::cache::{CacheStats, Clock, SystemClock};
use crate::error::CacheError;
use crate::store::KeyValueStore;

/// Ttl applied by [`CacheUtils::get`] when the caller passes none.
pub const DEFAULT_TTL_MS: u64 = 300_000;

/// Second suffix matched by [`CacheUtils::clear_all`].
pub const CACHE_SUFFIX: &str = "_cache";

// == Cache Utils ==
/// Handle to the cache facade. Cloning is cheap and clones share the store,
/// clock and read counters.
#[derive(Clone)]
pub struct CacheUtils {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    default_ttl_ms: u64,
    stats: Arc<Mutex<CacheStats>>,
}

impl CacheUtils {
    // == Constructor ==
    /// Creates a facade over `store`, reading time from `clock`.
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            default_ttl_ms: DEFAULT_TTL_MS,
            stats: Arc::new(Mutex::new(CacheStats::new())),
        }
    }

    /// Creates a facade over `store` using wall-clock time.
    pub fn with_system_clock(store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(store, Arc::new(SystemClock))
    }

    /// Overrides the ttl used by reads that pass none.
    pub fn with_default_ttl(mut self, ttl_ms: u64) -> Self {
        self.default_ttl_ms = ttl_ms;
        self
    }

    pub fn default_ttl_ms(&self) -> u64 {
        self.default_ttl_ms
    }

    /// Current time according to the facade's clock.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    // == Get ==
    /// Returns the value stored under `key` if present and fresh.
    ///
    /// A missing entry, a stale entry and an undecodable entry all yield
    /// `None`. Stale entries are left in place.
    ///
    /// # Arguments
    /// * `key` - The cache key
    /// * `ttl_ms` - Freshness window in milliseconds (facade default if None)
    pub fn get<T: DeserializeOwned>(&self, key: &str, ttl_ms: Option<u64>) -> Option<T> {
        let ttl_ms = ttl_ms.unwrap_or(self.default_ttl_ms);

        let value = match self.read(key, ttl_ms) {
            Ok(Some(decoded)) if decoded.fresh => {
                debug!(key = %key, age_ms = decoded.entry.age_ms(self.now_ms()), "Cache hit");
                Some(decoded.entry.value)
            }
            Ok(Some(decoded)) => {
                debug!(key = %key, stored_at = decoded.entry.stored_at, ttl_ms, "Cache entry stale");
                None
            }
            Ok(None) => {
                debug!(key = %key, "Cache miss");
                None
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Ignoring unreadable cache entry");
                None
            }
        };

        let mut stats = self.stats.lock();
        if value.is_some() {
            stats.record_hit();
        } else {
            stats.record_miss();
        }
        value
    }

    /// Reads and decodes the record pair for `key`.
    ///
    /// `Ok(None)` means neither record exists; any other inconsistency is an
    /// error so the caller can log it.
    fn read<T: DeserializeOwned>(
        &self,
        key: &str,
        ttl_ms: u64,
    ) -> Result<Option<Decoded<T>>, String> {
        let raw_value = self.store.get(key).map_err(|e| e.to_string())?;
        let raw_timestamp = self
            .store
            .get(&codec::timestamp_key(key))
            .map_err(|e| e.to_string())?;

        if raw_value.is_none() && raw_timestamp.is_none() {
            return Ok(None);
        }

        codec::decode(
            key,
            raw_value.as_deref(),
            raw_timestamp.as_deref(),
            self.now_ms(),
            ttl_ms,
        )
        .map(Some)
        .map_err(|e: DecodeError| e.to_string())
    }

    // == Set ==
    /// Overwrites both records for `key` with `value` captured now.
    ///
    /// Failures are logged and otherwise ignored. The value record is written
    /// first; if that fails the timestamp is left untouched.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.write(key, value) {
            warn!(key = %key, error = %e, "Failed to persist cache entry");
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let encoded = codec::encode(value, self.now_ms())?;
        self.store
            .set(key, &encoded.value)
            .map_err(|e| CacheError::Internal(e.to_string()))?;
        self.store
            .set(&codec::timestamp_key(key), &encoded.timestamp)
            .map_err(|e| CacheError::Internal(e.to_string()))?;
        debug!(key = %key, "Cache entry stored");
        Ok(())
    }

    // == Clear ==
    /// Removes both records for `key`.
    pub fn clear(&self, key: &str) {
        for record in [key.to_string(), codec::timestamp_key(key)] {
            if let Err(e) = self.store.remove(&record) {
                warn!(key = %record, error = %e, "Failed to remove cache record");
            }
        }
        debug!(key = %key, "Cache entry cleared");
    }

    // == Clear All ==
    /// Removes every store key ending in `_timestamp` or `_cache`.
    ///
    /// Value records are only removed when their own name happens to carry
    /// one of those suffixes, so a plain `profile` value survives while
    /// `profile_timestamp` is removed. With its timestamp gone the survivor
    /// reads as a miss.
    ///
    /// # Returns
    /// The number of keys removed.
    pub fn clear_all(&self) -> usize {
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "Failed to enumerate store keys");
                return 0;
            }
        };

        let mut removed = 0;
        for key in keys
            .iter()
            .filter(|k| k.ends_with(TIMESTAMP_SUFFIX) || k.ends_with(CACHE_SUFFIX))
        {
            match self.store.remove(key) {
                Ok(()) => removed += 1,
                Err(e) => warn!(key = %key, error = %e, "Failed to remove cache record"),
            }
        }

        info!(removed, "Cleared cache records");
        removed
    }

    // == Stats ==
    /// Number of timestamp records in the store, i.e. entries written
    /// through the codec and not yet cleared.
    pub fn entry_count(&self) -> usize {
        match self.store.keys() {
            Ok(keys) => keys.iter().filter(|k| k.ends_with(TIMESTAMP_SUFFIX)).count(),
            Err(e) => {
                warn!(error = %e, "Failed to enumerate store keys");
                0
            }
        }
    }

    /// Snapshot of read counters and the current entry count.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.lock().clone();
        stats.set_total_entries(self.entry_count());
        stats
    }
}

impl std::fmt::Debug for CacheUtils {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheUtils")
            .field("default_ttl_ms", &self.default_ttl_ms)
            .finish_non_exhaustive()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::store::MemoryStore;

    fn setup() -> (Arc<MemoryStore>, Arc<ManualClock>, CacheUtils) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(0));
        let utils = CacheUtils::new(store.clone(), clock.clone());
        (store, clock, utils)
    }

    #[test]
    fn test_set_then_get() {
        let (_, _, utils) = setup();
        utils.set("users_list", &vec!["ana", "bo"]);

        let value: Option<Vec<String>> = utils.get("users_list", None);
        assert_eq!(value, Some(vec!["ana".to_string(), "bo".to_string()]));
    }

    #[test]
    fn test_set_writes_both_records() {
        let (store, clock, utils) = setup();
        clock.set(42);
        utils.set("news", &"headline");

        assert_eq!(store.get("news").unwrap(), Some(r#""headline""#.to_string()));
        assert_eq!(store.get("news_timestamp").unwrap(), Some("42".to_string()));
    }

    #[test]
    fn test_get_missing_is_none() {
        let (_, _, utils) = setup();
        let value: Option<u32> = utils.get("nothing", None);
        assert!(value.is_none());
    }

    #[test]
    fn test_get_uses_default_ttl() {
        let (_, clock, utils) = setup();
        utils.set("k", &1);

        clock.set(DEFAULT_TTL_MS - 1);
        assert_eq!(utils.get::<u32>("k", None), Some(1));

        clock.set(DEFAULT_TTL_MS);
        assert_eq!(utils.get::<u32>("k", None), None);
    }

    #[test]
    fn test_custom_default_ttl() {
        let (store, clock, _) = setup();
        let utils = CacheUtils::new(store, clock.clone()).with_default_ttl(1_000);
        utils.set("k", &1);

        clock.set(1_000);
        assert_eq!(utils.get::<u32>("k", None), None);
        assert_eq!(utils.get::<u32>("k", Some(2_000)), Some(1));
    }

    #[test]
    fn test_stale_entry_stays_in_store() {
        let (store, clock, utils) = setup();
        utils.set("k", &"A");
        clock.set(10_000);

        assert_eq!(utils.get::<String>("k", Some(5_000)), None);
        assert!(store.get("k").unwrap().is_some());
        assert!(store.get("k_timestamp").unwrap().is_some());
    }

    #[test]
    fn test_corrupt_value_is_a_miss() {
        let (store, _, utils) = setup();
        store.set("k", "{broken").unwrap();
        store.set("k_timestamp", "0").unwrap();

        assert_eq!(utils.get::<Vec<u32>>("k", None), None);
    }

    #[test]
    fn test_value_without_timestamp_is_a_miss() {
        let (store, _, utils) = setup();
        store.set("k", "[1]").unwrap();

        assert_eq!(utils.get::<Vec<u32>>("k", None), None);
    }

    #[test]
    fn test_garbage_timestamp_is_a_miss() {
        let (store, _, utils) = setup();
        store.set("k", "[1]").unwrap();
        store.set("k_timestamp", "NaN").unwrap();

        assert_eq!(utils.get::<Vec<u32>>("k", None), None);
    }

    #[test]
    fn test_set_overwrites_and_restamps() {
        let (_, clock, utils) = setup();
        utils.set("k", &"old");
        clock.set(200_000);
        utils.set("k", &"new");
        clock.set(400_000);

        // Fresh relative to the second write only
        assert_eq!(utils.get::<String>("k", Some(300_000)), Some("new".to_string()));
    }

    #[test]
    fn test_failed_write_is_swallowed() {
        let store = Arc::new(MemoryStore::with_quota(16));
        let utils = CacheUtils::new(store.clone(), Arc::new(ManualClock::new(0)));

        utils.set("big", &"x".repeat(64));

        assert!(store.is_empty());
        assert_eq!(utils.get::<String>("big", None), None);
    }

    #[test]
    fn test_clear_removes_pair() {
        let (store, _, utils) = setup();
        utils.set("k", &1);
        utils.set("other", &2);
        utils.clear("k");

        assert_eq!(store.get("k").unwrap(), None);
        assert_eq!(store.get("k_timestamp").unwrap(), None);
        assert_eq!(utils.get::<u32>("other", None), Some(2));
    }

    #[test]
    fn test_clear_all_removes_suffixed_keys_only() {
        let (store, _, utils) = setup();
        utils.set("profile", &"me");
        store.set("session_cache", "x").unwrap();
        store.set("theme", "dark").unwrap();

        let removed = utils.clear_all();

        assert_eq!(removed, 2);
        assert_eq!(store.get("profile_timestamp").unwrap(), None);
        assert_eq!(store.get("session_cache").unwrap(), None);
        assert_eq!(store.get("profile").unwrap(), Some(r#""me""#.to_string()));
        assert_eq!(store.get("theme").unwrap(), Some("dark".to_string()));
        assert_eq!(utils.get::<String>("profile", None), None);
    }

    #[test]
    fn test_stats_track_reads_and_entries() {
        let (_, _, utils) = setup();
        utils.set("a", &1);
        utils.set("b", &2);

        let _ = utils.get::<u32>("a", None);
        let _ = utils.get::<u32>("missing", None);

        let stats = utils.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 2);
    }

    #[test]
    fn test_clones_share_counters() {
        let (_, _, utils) = setup();
        let other = utils.clone();
        let _ = other.get::<u32>("missing", None);

        assert_eq!(utils.stats().misses, 1);
    }
}
