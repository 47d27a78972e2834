//! Configuration Module
//!
//! Loads the cache service configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Directory name under the platform data dir holding the store file.
const APP_NAME: &str = "dashboard_cache";

/// Store file name
const STORE_FILE: &str = "store.json";

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Location of the durable store document
    pub store_path: PathBuf,
    /// Ttl in milliseconds for reads that do not pass one
    pub default_ttl_ms: u64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `STORE_PATH` - Store document path (default: `<data dir>/dashboard_cache/store.json`)
    /// - `DEFAULT_TTL_MS` - Default read ttl in milliseconds (default: 300000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            store_path: env::var("STORE_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            default_ttl_ms: env::var("DEFAULT_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_ttl_ms),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
        }
    }

    /// Platform-local default for the store document.
    fn default_store_path() -> PathBuf {
        match dirs::data_local_dir() {
            Some(dir) => dir.join(APP_NAME).join(STORE_FILE),
            None => PathBuf::from(format!("{}_{}", APP_NAME, STORE_FILE)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: Self::default_store_path(),
            default_ttl_ms: crate::cache::DEFAULT_TTL_MS,
            server_port: 3000,
        }
    }
}
