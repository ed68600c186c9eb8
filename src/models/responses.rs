//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::HashMap;

use serde::Serialize;

use crate::backends::BackendKind;
use crate::cache::CacheStats;
use crate::facade::Route;

/// Response body for the GET operation (GET /cache/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: String,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Response body for the SET operation (POST /cache/:key)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
    /// Where the write went (`mirror` or a backend name)
    pub cache: String,
}

impl SetResponse {
    pub fn new(key: impl Into<String>, route: Route) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
            cache: route.to_string(),
        }
    }
}

/// Response body for the DELETE operation (DELETE /cache/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
    pub cache: String,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>, route: Route) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
            cache: route.to_string(),
        }
    }
}

/// Response body for the snapshot endpoint (GET /cache)
#[derive(Debug, Clone, Serialize)]
pub struct AllEntriesResponse {
    pub count: usize,
    pub entries: HashMap<String, String>,
}

impl From<HashMap<String, String>> for AllEntriesResponse {
    fn from(entries: HashMap<String, String>) -> Self {
        Self {
            count: entries.len(),
            entries,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses, expirations included
    pub misses: u64,
    /// Number of LRU evictions
    pub evictions: u64,
    /// Entries removed because their TTL had passed
    pub expirations: u64,
    /// Current number of entries in the local engine
    pub total_entries: usize,
    /// Configured engine capacity
    pub capacity: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    pub fn new(stats: &CacheStats, capacity: usize) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
            capacity,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Active backends in priority order
    pub backends: Vec<BackendKind>,
    /// Route used when a request names no backend
    pub default_cache: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(backends: Vec<BackendKind>, default_route: Route) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            backends,
            default_cache: default_route.to_string(),
        }
    }
}
