//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_handler, get_all_handler, get_handler, health_handler, set_handler, stats_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /cache` - Snapshot of live entries
/// - `GET /cache/:key` - Retrieve a value by key
/// - `POST /cache/:key` - Store a value
/// - `DELETE /cache/:key` - Delete a key
/// - `GET /stats` - Local engine statistics
/// - `GET /health` - Health check endpoint
///
/// `/cache` routes take an optional `?cache=lru|redis|memcached` selector.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/cache", get(get_all_handler))
        .route(
            "/cache/:key",
            get(get_handler).post(set_handler).delete(delete_handler),
        )
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
