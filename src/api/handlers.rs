//! API Handlers
//!
//! HTTP request handlers for each inspection endpoint. All of them go
//! through [`CacheUtils`], so the service sees exactly what a dashboard page
//! would see.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use crate::cache::CacheUtils;
use crate::config::Config;
use crate::error::{CacheError, Result, StoreError};
use crate::models::requests::validate_key;
use crate::models::{
    ClearAllResponse, DeleteResponse, GetQuery, GetResponse, HealthResponse, SetRequest,
    SetResponse, StatsResponse,
};
use crate::store::FileStore;

/// Application state shared across all handlers.
///
/// The facade is cheap to clone and synchronizes internally, so no outer
/// lock is needed.
#[derive(Clone, Debug)]
pub struct AppState {
    pub cache: CacheUtils,
}

impl AppState {
    /// Creates a new AppState around an existing facade.
    pub fn new(cache: CacheUtils) -> Self {
        Self { cache }
    }

    /// Opens the configured file store and builds the facade over it.
    pub fn from_config(config: &Config) -> std::result::Result<Self, StoreError> {
        let store = FileStore::open(&config.store_path)?;
        let cache =
            CacheUtils::with_system_clock(Arc::new(store)).with_default_ttl(config.default_ttl_ms);
        Ok(Self::new(cache))
    }
}

fn check_key(key: &str) -> Result<()> {
    match validate_key(key) {
        Some(msg) => Err(CacheError::InvalidRequest(msg)),
        None => Ok(()),
    }
}

/// Handler for GET /cache/:key
///
/// Missing, stale and undecodable entries all answer 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<GetQuery>,
) -> Result<Json<GetResponse>> {
    check_key(&key)?;

    let value: Value = state
        .cache
        .get(&key, query.ttl)
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for PUT /cache/:key
pub async fn set_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    check_key(&key)?;
    state.cache.set(&key, &req.value);
    Ok(Json(SetResponse::new(key)))
}

/// Handler for DELETE /cache/:key
///
/// Clearing an absent key succeeds.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    check_key(&key)?;
    state.cache.clear(&key);
    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /cache
pub async fn clear_all_handler(State(state): State<AppState>) -> Json<ClearAllResponse> {
    let removed = state.cache.clear_all();
    Json(ClearAllResponse::new(removed))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats();
    Json(StatsResponse::new(
        stats.hits,
        stats.misses,
        stats.total_entries,
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
