//! Memcached Client
//!
//! [`MemoryObjectClient`] over the blocking `memcache` client. Every call is
//! moved onto tokio's blocking pool so it never stalls the async workers.

use std::sync::Arc;

use async_trait::async_trait;
use memcache::MemcacheError;

use crate::backends::{ClientError, MemoryObjectClient};

/// Pooled connection to one Memcached server.
#[derive(Clone)]
pub struct MemcachedClient {
    client: Arc<memcache::Client>,
}

impl MemcachedClient {
    /// Connects to `address`, given either as `host:port` or a `memcache://` URL.
    pub async fn open(address: &str) -> Result<Self, ClientError> {
        let url = if address.contains("://") {
            address.to_string()
        } else {
            format!("memcache://{}", address)
        };
        let client = tokio::task::spawn_blocking(move || memcache::Client::connect(url.as_str()))
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?
            .map_err(map_err)?;
        Ok(Self {
            client: Arc::new(client),
        })
    }

    async fn run<T, F>(&self, op: F) -> Result<T, ClientError>
    where
        T: Send + 'static,
        F: FnOnce(&memcache::Client) -> Result<T, MemcacheError> + Send + 'static,
    {
        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || op(&client))
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?
            .map_err(map_err)
    }
}

fn map_err(err: MemcacheError) -> ClientError {
    match err {
        MemcacheError::IOError(e) => ClientError::Connection(e.to_string()),
        other => ClientError::Protocol(other.to_string()),
    }
}

#[async_trait]
impl MemoryObjectClient for MemcachedClient {
    async fn ping(&self) -> Result<(), ClientError> {
        self.run(|client| client.version().map(|_| ())).await
    }

    async fn set(&self, key: &str, value: &str, expiration: u32) -> Result<(), ClientError> {
        let (key, value) = (key.to_string(), value.to_string());
        self.run(move |client| client.set(&key, value.as_str(), expiration))
            .await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        let key = key.to_string();
        self.run(move |client| client.get::<String>(&key)).await
    }

    async fn delete(&self, key: &str) -> Result<bool, ClientError> {
        let key = key.to_string();
        self.run(move |client| client.delete(&key)).await
    }
}
