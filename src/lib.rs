//! Dashboard Cache - TTL caching for list pages backed by a durable store
//!
//! Provides a stateless cache facade, a per-key cache controller with an
//! in-memory recency guard, and an HTTP service for inspecting the store.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use api::AppState;
pub use cache::{CacheController, CacheUtils};
pub use config::Config;
pub use store::{FileStore, KeyValueStore, MemoryStore};
