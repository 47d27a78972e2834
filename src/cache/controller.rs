//! Stateful Cache Controller
//!
//! Binds one cache key to in-memory `data / loading / error` state and
//! decides, per load, whether to trust memory, trust the persisted store, or
//! call the fetch function.
//!
//! Decision order for [`CacheController::load_data`] without a forced
//! refresh:
//!
//! 1. A successful load finished less than `ttl` ago on this instance:
//!    return the in-memory data.
//! 2. The persisted store holds a fresh entry: adopt it.
//! 3. Otherwise fetch, then write the result through to memory and store.
//!
//! Each instance keeps its own recency. Two controllers bound to the same key
//! share the persisted entry but not each other's memory, and neither
//! de-duplicates concurrent fetches.

use std::future::Future;

use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::CacheUtils;
use crate::error::{CacheError, Result};

// == Cache Status ==
/// Coarse lifecycle of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    /// Holding only the caller's initial value
    Idle,
    /// A fetch is in flight
    Loading,
    /// Holding a value from the store, a fetch, or an update
    Ready,
    /// The last fetch failed
    Errored,
}

#[derive(Debug)]
struct ControllerState<T> {
    data: T,
    loading: bool,
    error: Option<CacheError>,
    last_load_time: Option<u64>,
    ready: bool,
}

/// Resets `loading` when a fetch finishes, fails, or its future is dropped.
struct LoadingGuard<'a, T> {
    state: &'a Mutex<ControllerState<T>>,
}

impl<'a, T> LoadingGuard<'a, T> {
    fn begin(state: &'a Mutex<ControllerState<T>>) -> Self {
        let mut guard = state.lock();
        guard.loading = true;
        guard.error = None;
        drop(guard);
        Self { state }
    }
}

impl<T> Drop for LoadingGuard<'_, T> {
    fn drop(&mut self) {
        self.state.lock().loading = false;
    }
}

// == Cache Controller ==
/// A cache binding for one key, holding the value a page renders.
#[derive(Debug)]
pub struct CacheController<T> {
    key: String,
    ttl_ms: u64,
    utils: CacheUtils,
    state: Mutex<ControllerState<T>>,
}

impl<T> CacheController<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    // == Constructor ==
    /// Binds a controller to `key`.
    ///
    /// Seeds `data` from the persisted store when it holds a fresh entry,
    /// otherwise from `initial`. Recency always starts empty, so the first
    /// [`load_data`](Self::load_data) consults the store again.
    ///
    /// # Arguments
    /// * `key` - The cache key
    /// * `utils` - Facade over the shared store
    /// * `ttl_ms` - Freshness window for both memory and store
    /// * `initial` - Value exposed until something better is loaded
    pub fn new(key: impl Into<String>, utils: CacheUtils, ttl_ms: u64, initial: T) -> Self {
        let key = key.into();
        let seeded: Option<T> = utils.get(&key, Some(ttl_ms));
        let ready = seeded.is_some();

        debug!(key = %key, ttl_ms, seeded = ready, "Cache controller created");

        Self {
            key,
            ttl_ms,
            utils,
            state: Mutex::new(ControllerState {
                data: seeded.unwrap_or(initial),
                loading: false,
                error: None,
                last_load_time: None,
                ready,
            }),
        }
    }

    // == Accessors ==
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    /// Current in-memory value.
    pub fn data(&self) -> T {
        self.state.lock().data.clone()
    }

    pub fn loading(&self) -> bool {
        self.state.lock().loading
    }

    /// Failure of the most recent fetch, cleared when the next fetch starts.
    pub fn error(&self) -> Option<CacheError> {
        self.state.lock().error.clone()
    }

    /// Epoch millis of the last load that completed on this instance.
    pub fn last_load_time(&self) -> Option<u64> {
        self.state.lock().last_load_time
    }

    pub fn status(&self) -> CacheStatus {
        let state = self.state.lock();
        if state.loading {
            CacheStatus::Loading
        } else if state.error.is_some() {
            CacheStatus::Errored
        } else if state.ready {
            CacheStatus::Ready
        } else {
            CacheStatus::Idle
        }
    }

    // == Load Data ==
    /// Returns fresh data, fetching only when neither memory nor store has it.
    ///
    /// With `force_refresh` both checks are skipped and `fetch` always runs.
    /// A fetch failure is recorded in [`error`](Self::error) and returned;
    /// `data` keeps its previous value.
    pub async fn load_data<F, Fut, E>(&self, fetch: F, force_refresh: bool) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Into<anyhow::Error>,
    {
        if !force_refresh {
            let now = self.utils.now_ms();

            {
                let state = self.state.lock();
                if let Some(last) = state.last_load_time {
                    if now.saturating_sub(last) < self.ttl_ms {
                        debug!(key = %self.key, since_ms = now.saturating_sub(last), "Serving recent in-memory data");
                        return Ok(state.data.clone());
                    }
                }
            }

            if let Some(cached) = self.utils.get::<T>(&self.key, Some(self.ttl_ms)) {
                debug!(key = %self.key, "Adopting persisted entry");
                let mut state = self.state.lock();
                state.data = cached.clone();
                state.last_load_time = Some(now);
                state.ready = true;
                return Ok(cached);
            }
        }

        let _loading = LoadingGuard::begin(&self.state);
        debug!(key = %self.key, force_refresh, "Fetching");

        match fetch().await {
            Ok(value) => {
                self.utils.set(&self.key, &value);
                let mut state = self.state.lock();
                state.data = value.clone();
                state.last_load_time = Some(self.utils.now_ms());
                state.ready = true;
                Ok(value)
            }
            Err(e) => {
                let err = CacheError::fetch(&self.key, e);
                warn!(key = %self.key, error = %err, "Fetch failed");
                self.state.lock().error = Some(err.clone());
                Err(err)
            }
        }
    }

    // == Refresh Data ==
    /// Same as `load_data(fetch, true)`.
    pub async fn refresh_data<F, Fut, E>(&self, fetch: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Into<anyhow::Error>,
    {
        self.load_data(fetch, true).await
    }

    // == Update Data ==
    /// Replaces the in-memory value and writes it through to the store.
    ///
    /// Recency is left alone: the update does not count as a load.
    pub fn update_data(&self, new_data: T) {
        self.utils.set(&self.key, &new_data);
        let mut state = self.state.lock();
        state.data = new_data;
        state.ready = true;
    }

    // == Clear Cache ==
    /// Removes the persisted entry. In-memory `data` is kept until the next
    /// load replaces it.
    pub fn clear_cache(&self) {
        self.utils.clear(&self.key);
    }
}
