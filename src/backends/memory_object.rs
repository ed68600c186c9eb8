//! Memory-Object Store Adapter
//!
//! Puts a Memcached-like [`MemoryObjectClient`] behind the cache contract.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::backends::{BackendKind, ClientError, MemoryObjectClient};
use crate::cache::Cache;
use crate::error::{CacheError, Result};

const KIND: BackendKind = BackendKind::Memcached;

/// Longest expiration memcached accepts as a relative number of seconds.
/// Anything larger is read by the server as an absolute unix timestamp.
pub const MAX_RELATIVE_EXPIRATION_SECS: u64 = 60 * 60 * 24 * 30;

/// Converts a TTL into a memcached expiration value.
///
/// Seconds are rounded up so a short TTL never becomes 0 ("never expire").
/// TTLs over 30 days become an absolute timestamp relative to `now_unix`.
pub fn expiration_secs(ttl: Duration, now_unix: i64) -> u32 {
    let secs = ttl
        .as_secs()
        .saturating_add(u64::from(ttl.subsec_nanos() > 0))
        .max(1);

    if secs <= MAX_RELATIVE_EXPIRATION_SECS {
        return secs as u32;
    }

    let absolute = u64::try_from(now_unix)
        .unwrap_or(0)
        .saturating_add(secs);
    u32::try_from(absolute).unwrap_or(u32::MAX)
}

/// Cache contract over a networked memory-object client.
#[derive(Debug)]
pub struct MemoryObjectStore<C> {
    client: C,
}

impl<C: MemoryObjectClient> MemoryObjectStore<C> {
    /// Wraps a client without checking connectivity.
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Wraps a client after a successful ping.
    pub async fn connect(client: C) -> Result<Self> {
        client.ping().await.map_err(unavailable)?;
        debug!(backend = %KIND, "remote store reachable");
        Ok(Self::new(client))
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

fn unavailable(err: ClientError) -> CacheError {
    warn!(backend = %KIND, error = %err, "remote store call failed");
    CacheError::unavailable(KIND, err)
}

#[async_trait]
impl<C: MemoryObjectClient> Cache for MemoryObjectStore<C> {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        if ttl.is_zero() {
            self.client.delete(key).await.map_err(unavailable)?;
            return Ok(());
        }
        let expiration = expiration_secs(ttl, chrono::Utc::now().timestamp());
        self.client
            .set(key, value, expiration)
            .await
            .map_err(unavailable)
    }

    async fn get(&self, key: &str) -> Result<String> {
        self.client
            .get(key)
            .await
            .map_err(unavailable)?
            .ok_or_else(|| CacheError::CacheMiss(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        if self.client.delete(key).await.map_err(unavailable)? {
            Ok(())
        } else {
            Err(CacheError::KeyNotFound(key.to_string()))
        }
    }

    /// Memcached cannot enumerate its keys.
    async fn get_all(&self) -> Result<HashMap<String, String>> {
        Ok(HashMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::client::fake::FakeClient;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn test_expiration_rounds_up() {
        assert_eq!(expiration_secs(Duration::from_millis(10), NOW), 1);
        assert_eq!(expiration_secs(Duration::from_millis(1500), NOW), 2);
        assert_eq!(expiration_secs(Duration::from_secs(60), NOW), 60);
    }

    #[test]
    fn test_expiration_over_thirty_days_is_absolute() {
        let limit = Duration::from_secs(MAX_RELATIVE_EXPIRATION_SECS);
        assert_eq!(
            expiration_secs(limit, NOW),
            MAX_RELATIVE_EXPIRATION_SECS as u32
        );

        let longer = Duration::from_secs(MAX_RELATIVE_EXPIRATION_SECS + 1);
        assert_eq!(
            expiration_secs(longer, NOW),
            (NOW as u64 + MAX_RELATIVE_EXPIRATION_SECS + 1) as u32
        );

        assert_eq!(expiration_secs(Duration::MAX, NOW), u32::MAX);
    }

    #[tokio::test]
    async fn test_round_trip() {
        let store = MemoryObjectStore::new(FakeClient::new());

        store.set("k", "v", Duration::from_millis(250)).await.unwrap();
        assert_eq!(*store.client().last_expiration.lock(), Some(1));
        assert_eq!(store.get("k").await.unwrap(), "v");

        store.delete("k").await.unwrap();
        assert_eq!(store.delete("k").await, Err(CacheError::KeyNotFound("k".into())));
        assert_eq!(store.get("k").await, Err(CacheError::CacheMiss("k".into())));
    }

    #[tokio::test]
    async fn test_zero_ttl_removes_key() {
        let store = MemoryObjectStore::new(FakeClient::new().with_value("k", "v"));
        store.set("k", "v2", Duration::ZERO).await.unwrap();
        assert!(store.client().value("k").is_none());
    }

    #[tokio::test]
    async fn test_client_failure_is_backend_unavailable() {
        let store = MemoryObjectStore::new(FakeClient::new());
        store.client().set_down(true);

        let err = store.get("k").await.unwrap_err();
        assert!(matches!(
            err,
            CacheError::BackendUnavailable { backend: BackendKind::Memcached, .. }
        ));
        assert!(store.set("k", "v", Duration::from_secs(1)).await.unwrap_err().is_unavailable());
    }

    #[tokio::test]
    async fn test_connect_rejects_unreachable() {
        let down = FakeClient::new();
        down.set_down(true);
        assert!(MemoryObjectStore::connect(down).await.unwrap_err().is_unavailable());
    }
}
