//! Cache Module
//!
//! TTL caching over a durable key-value store: the entry codec, the
//! stateless facade, and the per-key stateful controller.

mod clock;
pub mod codec;
mod controller;
mod entry;
mod stats;
mod utils;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{DecodeError, Decoded, EncodedEntry};
pub use controller::{CacheController, CacheStatus};
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use utils::{CacheUtils, CACHE_SUFFIX, DEFAULT_TTL_MS};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
