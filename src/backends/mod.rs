//! Backends Module
//!
//! Identifiers for the three backend kinds and the adapters that put the
//! remote stores behind the [`Cache`](crate::cache::Cache) contract.
//!
//! # Backends
//! - `lru` - the process-local [`LruEngine`](crate::cache::LruEngine)
//! - `redis` - a networked key-value store, via [`KeyValueStore`]
//! - `memcached` - a networked memory-object store, via [`MemoryObjectStore`]

pub(crate) mod client;
mod key_value;
mod memory_object;

#[cfg(feature = "memcached-backend")]
mod memcached_client;
#[cfg(feature = "redis-backend")]
mod redis_client;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{CacheError, Result};

pub use client::{ClientError, KeyValueClient, MemoryObjectClient};
pub use key_value::KeyValueStore;
pub use memory_object::{expiration_secs, MemoryObjectStore, MAX_RELATIVE_EXPIRATION_SECS};

#[cfg(feature = "memcached-backend")]
pub use memcached_client::MemcachedClient;
#[cfg(feature = "redis-backend")]
pub use redis_client::RedisClient;

// == Backend Kind ==
/// Names one backing store. Ordering is the facade's read priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Process-local LRU engine
    Lru,
    /// Networked key-value store
    Redis,
    /// Networked memory-object store
    Memcached,
}

impl BackendKind {
    /// Every kind in priority order.
    pub const ALL: [BackendKind; 3] = [BackendKind::Lru, BackendKind::Redis, BackendKind::Memcached];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Lru => "lru",
            BackendKind::Redis => "redis",
            BackendKind::Memcached => "memcached",
        }
    }

    /// Whether the backend lives in another process.
    pub fn is_remote(&self) -> bool {
        !matches!(self, BackendKind::Lru)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" | "inmemory" | "in_memory" | "local" => Ok(BackendKind::Lru),
            "redis" => Ok(BackendKind::Redis),
            "memcached" | "memcache" => Ok(BackendKind::Memcached),
            other => Err(CacheError::InvalidRequest(format!(
                "unknown cache type: {}",
                other
            ))),
        }
    }
}

/// Returns the address of a remote backend, or `InvalidConfiguration` when it
/// is missing or blank.
pub fn require_address(kind: BackendKind, address: Option<&str>) -> Result<&str> {
    match address.map(str::trim) {
        Some(addr) if !addr.is_empty() => Ok(addr),
        _ => Err(CacheError::InvalidConfiguration(format!(
            "{} backend requires an address",
            kind
        ))),
    }
}
