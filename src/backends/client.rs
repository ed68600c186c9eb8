//! Remote Client Abstractions
//!
//! The adapters never speak a wire protocol themselves; they drive one of
//! these client traits. An absent key is a normal outcome (`None`/`false`),
//! only transport or protocol trouble is a `ClientError`.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by a networked client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The server could not be reached
    #[error("connection failed: {0}")]
    Connection(String),

    /// The server answered with an error or an unreadable reply
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// A networked key-value store client (Redis-like).
#[async_trait]
pub trait KeyValueClient: Send + Sync {
    /// Round-trips to the server.
    async fn ping(&self) -> Result<(), ClientError>;

    /// Stores `value` with a millisecond-precision expiry. `ttl` is non-zero.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), ClientError>;

    async fn get(&self, key: &str) -> Result<Option<String>, ClientError>;

    /// Returns whether the key existed.
    async fn delete(&self, key: &str) -> Result<bool, ClientError>;
}

/// A networked memory-object store client (Memcached-like).
#[async_trait]
pub trait MemoryObjectClient: Send + Sync {
    async fn ping(&self) -> Result<(), ClientError>;

    /// Stores `value`. `expiration` follows memcached rules: seconds when at
    /// most 30 days, otherwise an absolute unix timestamp. Never zero.
    async fn set(&self, key: &str, value: &str, expiration: u32) -> Result<(), ClientError>;

    async fn get(&self, key: &str) -> Result<Option<String>, ClientError>;

    /// Returns whether the key existed.
    async fn delete(&self, key: &str) -> Result<bool, ClientError>;
}
