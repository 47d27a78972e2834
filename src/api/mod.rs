//! API Module
//!
//! HTTP handlers and routing for inspecting and invalidating the persisted
//! cache.
//!
//! # Endpoints
//! - `GET /cache/:key?ttl=ms` - Read a fresh value
//! - `PUT /cache/:key` - Overwrite a value
//! - `DELETE /cache/:key` - Clear one entry
//! - `DELETE /cache` - Clear all timestamped records
//! - `GET /stats` - Read counters and entry count
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
