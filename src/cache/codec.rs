//! TTL Entry Codec
//!
//! Maps a [`CacheEntry`] onto two co-located store records:
//!
//! - `key` holds the JSON-serialized value
//! - `key + "_timestamp"` holds the capture time as decimal epoch millis
//!
//! The pair is not written atomically. A value without a readable timestamp
//! (or the reverse) decodes as a [`DecodeError`], which the facade treats as
//! a miss.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::cache::CacheEntry;
use crate::error::CacheError;

/// Suffix of the companion record holding an entry's capture time.
pub const TIMESTAMP_SUFFIX: &str = "_timestamp";

/// Returns the companion timestamp record key for `key`.
pub fn timestamp_key(key: &str) -> String {
    format!("{}{}", key, TIMESTAMP_SUFFIX)
}

// == Encoded Entry ==
/// The two raw records an entry is stored as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedEntry {
    /// Serialized value, stored under the cache key
    pub value: String,
    /// Decimal capture time, stored under [`timestamp_key`]
    pub timestamp: String,
}

// == Decoded Entry ==
/// A successfully decoded entry with its freshness under the reader's ttl.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub entry: CacheEntry<T>,
    pub fresh: bool,
}

// == Decode Error ==
/// Why a pair of raw records could not be turned back into an entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("value record missing")]
    MissingValue,

    #[error("timestamp record missing")]
    MissingTimestamp,

    #[error("timestamp record unparseable: {0:?}")]
    InvalidTimestamp(String),

    #[error("value record unparseable: {0}")]
    InvalidValue(String),
}

// == Encode ==
/// Serializes `value` and pairs it with the capture time `now`.
pub fn encode<T: Serialize + ?Sized>(value: &T, now: u64) -> Result<EncodedEntry, CacheError> {
    let value = serde_json::to_string(value).map_err(|e| CacheError::Serialization(e.to_string()))?;
    Ok(EncodedEntry {
        value,
        timestamp: now.to_string(),
    })
}

// == Decode ==
/// Parses the raw record pair for `key` and judges freshness at `now`.
///
/// The timestamp is checked before the value so that a dangling value from
/// an interrupted write is reported as [`DecodeError::MissingTimestamp`].
pub fn decode<T: DeserializeOwned>(
    key: &str,
    raw_value: Option<&str>,
    raw_timestamp: Option<&str>,
    now: u64,
    ttl_ms: u64,
) -> Result<Decoded<T>, DecodeError> {
    let raw_value = raw_value.ok_or(DecodeError::MissingValue)?;
    let raw_timestamp = raw_timestamp.ok_or(DecodeError::MissingTimestamp)?;

    let stored_at: u64 = raw_timestamp
        .trim()
        .parse()
        .map_err(|_| DecodeError::InvalidTimestamp(raw_timestamp.to_string()))?;

    let value: T =
        serde_json::from_str(raw_value).map_err(|e| DecodeError::InvalidValue(e.to_string()))?;

    let entry = CacheEntry::new(key, value, stored_at);
    let fresh = entry.is_fresh(now, ttl_ms);
    Ok(Decoded { entry, fresh })
}
