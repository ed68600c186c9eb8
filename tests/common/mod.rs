//! Shared fixtures for the integration tests
//!
//! In-memory stand-ins for the networked clients, so the adapters and the
//! facade can be driven without a Redis or Memcached server.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use unified_cache::backends::{
    ClientError, KeyValueClient, KeyValueStore, MemoryObjectClient, MemoryObjectStore,
};
use unified_cache::{FacadeConfig, LruEngine, Route, UnifiedCache};

/// Remote store double. Clones share state, so a test can keep a handle
/// after moving one into an adapter.
#[derive(Clone, Debug, Default)]
pub struct MemoryServer {
    values: Arc<Mutex<HashMap<String, String>>>,
    down: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
    last_expiration: Arc<Mutex<Option<u32>>>,
}

impl MemoryServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.values.lock().insert(key.to_string(), value.to_string());
    }

    pub fn last_expiration(&self) -> Option<u32> {
        *self.last_expiration.lock()
    }

    fn enter(&self) -> Result<(), ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            Err(ClientError::Connection("connection refused".to_string()))
        } else {
            Ok(())
        }
    }

    fn store(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.enter()?;
        self.insert(key, value);
        Ok(())
    }

    fn fetch(&self, key: &str) -> Result<Option<String>, ClientError> {
        self.enter()?;
        Ok(self.value(key))
    }

    fn remove(&self, key: &str) -> Result<bool, ClientError> {
        self.enter()?;
        Ok(self.values.lock().remove(key).is_some())
    }
}

#[async_trait]
impl KeyValueClient for MemoryServer {
    async fn ping(&self) -> Result<(), ClientError> {
        self.enter()
    }

    async fn set(&self, key: &str, value: &str, _ttl: Duration) -> Result<(), ClientError> {
        self.store(key, value)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        self.fetch(key)
    }

    async fn delete(&self, key: &str) -> Result<bool, ClientError> {
        self.remove(key)
    }
}

#[async_trait]
impl MemoryObjectClient for MemoryServer {
    async fn ping(&self) -> Result<(), ClientError> {
        self.enter()
    }

    async fn set(&self, key: &str, value: &str, expiration: u32) -> Result<(), ClientError> {
        *self.last_expiration.lock() = Some(expiration);
        self.store(key, value)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        self.fetch(key)
    }

    async fn delete(&self, key: &str) -> Result<bool, ClientError> {
        self.remove(key)
    }
}

/// A facade over all three backends plus handles to each of them.
pub struct Stack {
    pub cache: UnifiedCache,
    pub local: Arc<LruEngine>,
    pub redis: MemoryServer,
    pub memcached: MemoryServer,
}

pub fn full_stack(default_route: Route, capacity: usize) -> Stack {
    let local = Arc::new(LruEngine::new(capacity));
    let redis = MemoryServer::new();
    let memcached = MemoryServer::new();

    let cache = UnifiedCache::builder(FacadeConfig {
        default_route,
        default_ttl: Duration::from_secs(60),
    })
    .local(Arc::clone(&local))
    .key_value(Arc::new(KeyValueStore::new(redis.clone())))
    .memory_object(Arc::new(MemoryObjectStore::new(memcached.clone())))
    .build()
    .unwrap();

    Stack {
        cache,
        local,
        redis,
        memcached,
    }
}
