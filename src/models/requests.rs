//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use std::time::Duration;

use serde::Deserialize;

use crate::backends::BackendKind;
use crate::error::Result;

/// Request body for the SET operation (POST /cache/:key)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The value to store
    pub value: String,
    /// Optional TTL in seconds; the configured default applies when absent
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl SetRequest {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl.map(Duration::from_secs)
    }
}

/// Query string shared by every `/cache` route.
///
/// `?cache=redis` targets one backend; no value means the configured default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSelector {
    #[serde(default)]
    pub cache: Option<String>,
}

impl CacheSelector {
    /// Parses the selector. An empty `cache=` counts as absent.
    pub fn backend(&self) -> Result<Option<BackendKind>> {
        match self.cache.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(name) => name.parse().map(Some),
        }
    }
}
