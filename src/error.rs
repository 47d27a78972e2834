//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Store Error Enum ==
/// Failures raised by a durable key-value store implementation.
///
/// These never reach callers of the cache facade; they are logged and
/// degraded to a miss (reads) or a no-op (writes).
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying file I/O failed
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted store contents could not be parsed
    #[error("Store contents corrupt: {0}")]
    Corrupt(String),

    /// The write would exceed the store's capacity
    #[error("Store quota exceeded: {0}")]
    QuotaExceeded(String),
}

// == Cache Error Enum ==
/// Unified error type for the cache layer.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Key missing or stale in the persisted store
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Value could not be serialized for storage
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// The caller-supplied fetch function failed
    #[error("Fetch failed for '{key}': {cause}")]
    Fetch {
        key: String,
        cause: Arc<anyhow::Error>,
    },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Wraps a fetch failure for the given cache key.
    pub fn fetch(key: impl Into<String>, cause: impl Into<anyhow::Error>) -> Self {
        CacheError::Fetch {
            key: key.into(),
            cause: Arc::new(cause.into()),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Serialization(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CacheError::Fetch { .. } => StatusCode::BAD_GATEWAY,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;
