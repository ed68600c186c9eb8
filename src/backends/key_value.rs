//! Key-Value Store Adapter
//!
//! Puts a Redis-like [`KeyValueClient`] behind the cache contract.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::backends::{BackendKind, ClientError, KeyValueClient};
use crate::cache::{Cache, MAX_TTL};
use crate::error::{CacheError, Result};

const KIND: BackendKind = BackendKind::Redis;

/// Cache contract over a networked key-value client.
#[derive(Debug)]
pub struct KeyValueStore<C> {
    client: C,
}

impl<C: KeyValueClient> KeyValueStore<C> {
    /// Wraps a client without checking connectivity.
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Wraps a client after a successful ping, so an unreachable store never
    /// starts serving.
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
impl<C: KeyValueClient> Cache for KeyValueStore<C> {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        if ttl.is_zero() {
            // An already-expired write leaves the key absent
            self.client.delete(key).await.map_err(unavailable)?;
            return Ok(());
        }
        // Redis rejects expiries beyond a signed 64-bit millisecond count
        self.client
            .set(key, value, ttl.min(MAX_TTL))
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

    /// Bulk enumeration is not offered by the remote store.
    async fn get_all(&self) -> Result<HashMap<String, String>> {
        Ok(HashMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::client::fake::FakeClient;

    #[tokio::test]
    async fn test_round_trip() {
        let store = KeyValueStore::new(FakeClient::new());

        store.set("k", "v", Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), "v");
        assert_eq!(*store.client().last_ttl.lock(), Some(Duration::from_secs(60)));

        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await, Err(CacheError::CacheMiss("k".into())));
    }

    #[tokio::test]
    async fn test_oversized_ttl_is_clamped() {
        let store = KeyValueStore::new(FakeClient::new());

        store.set("k", "v", Duration::MAX).await.unwrap();
        let sent = (*store.client().last_ttl.lock()).unwrap();
        assert_eq!(sent, MAX_TTL);
        assert!(sent.as_millis() < i64::MAX as u128);

        store.set("k", "v", Duration::from_secs(u64::MAX)).await.unwrap();
        assert_eq!(*store.client().last_ttl.lock(), Some(MAX_TTL));
    }

    #[tokio::test]
    async fn test_absent_key_errors() {
        let store = KeyValueStore::new(FakeClient::new());
        assert_eq!(store.get("x").await, Err(CacheError::CacheMiss("x".into())));
        assert_eq!(store.delete("x").await, Err(CacheError::KeyNotFound("x".into())));
    }

    #[tokio::test]
    async fn test_zero_ttl_removes_key() {
        let store = KeyValueStore::new(FakeClient::new().with_value("k", "old"));
        store.set("k", "new", Duration::ZERO).await.unwrap();
        assert!(store.client().value("k").is_none());
        assert!(store.client().last_ttl.lock().is_none());
    }

    #[tokio::test]
    async fn test_client_failure_is_backend_unavailable() {
        let store = KeyValueStore::new(FakeClient::new());
        store.client().set_down(true);

        for err in [
            store.set("k", "v", Duration::from_secs(1)).await.unwrap_err(),
            store.get("k").await.unwrap_err(),
            store.delete("k").await.unwrap_err(),
        ] {
            assert!(err.is_unavailable(), "{err:?}");
            assert!(matches!(
                err,
                CacheError::BackendUnavailable { backend: BackendKind::Redis, .. }
            ));
        }
    }

    #[tokio::test]
    async fn test_connect_pings() {
        assert!(KeyValueStore::connect(FakeClient::new()).await.is_ok());

        let down = FakeClient::new();
        down.set_down(true);
        let err = KeyValueStore::connect(down).await.unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_get_all_is_empty() {
        let store = KeyValueStore::new(FakeClient::new().with_value("k", "v"));
        assert!(store.get_all().await.unwrap().is_empty());
    }
}
