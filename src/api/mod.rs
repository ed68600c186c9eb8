//! API Module
//!
//! HTTP handlers and routing for the cache server REST API.
//!
//! # Endpoints
//! - `GET /cache` - Snapshot of live entries
//! - `GET|POST|DELETE /cache/:key` - Read, write or delete one key
//! - `GET /stats` - Local engine statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
