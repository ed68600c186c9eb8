//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint. Every `/cache`
//! handler accepts an optional `?cache=<backend>` selector; without one the
//! facade's default route applies.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::error::{CacheError, Result};
use crate::facade::UnifiedCache;
use crate::models::{
    AllEntriesResponse, CacheSelector, DeleteResponse, GetResponse, HealthResponse, SetRequest,
    SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// The facade synchronizes internally, so no outer lock is needed.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<UnifiedCache>,
}

impl AppState {
    pub fn new(cache: UnifiedCache) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }
}

/// Handler for POST /cache/:key
pub async fn set_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(selector): Query<CacheSelector>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    let route = state.cache.route(selector.backend()?);
    state.cache.set(route, &key, &req.value, req.ttl()).await?;

    Ok(Json(SetResponse::new(key, route)))
}

/// Handler for GET /cache/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(selector): Query<CacheSelector>,
) -> Result<Json<GetResponse>> {
    let route = state.cache.route(selector.backend()?);
    let value = state.cache.get(route, &key).await?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for DELETE /cache/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(selector): Query<CacheSelector>,
) -> Result<Json<DeleteResponse>> {
    let route = state.cache.route(selector.backend()?);
    state.cache.delete(route, &key).await?;

    Ok(Json(DeleteResponse::new(key, route)))
}

/// Handler for GET /cache
///
/// Remote stores cannot enumerate keys, so their snapshots are empty.
pub async fn get_all_handler(
    State(state): State<AppState>,
    Query(selector): Query<CacheSelector>,
) -> Result<Json<AllEntriesResponse>> {
    let route = state.cache.route(selector.backend()?);
    let entries = state.cache.get_all(route).await?;

    Ok(Json(AllEntriesResponse::from(entries)))
}

/// Handler for GET /stats
///
/// Statistics are kept by the local engine only.
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let engine = state.cache.local().ok_or_else(|| {
        CacheError::InvalidRequest("statistics require the lru cache to be active".to_string())
    })?;

    Ok(Json(StatsResponse::new(&engine.stats(), engine.capacity())))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(
        state.cache.backends().collect(),
        state.cache.config().default_route,
    ))
}
