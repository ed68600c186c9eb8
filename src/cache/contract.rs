//! Cache Contract
//!
//! The capability set shared by the local engine and the remote adapters.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Four operations every backend implements with the same error taxonomy.
///
/// - `get` fails with `CacheMiss` when the key is absent or expired.
/// - `delete` fails with `KeyNotFound` when the key is absent.
/// - Infrastructure failures surface as `BackendUnavailable`.
/// - `get_all` may return an empty map for stores that cannot enumerate.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Stores `value` under `key`, expiring `ttl` from now.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Reads the live value of `key`.
    async fn get(&self, key: &str) -> Result<String>;

    /// Removes `key`.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Snapshot of every live key and its value.
    async fn get_all(&self) -> Result<HashMap<String, String>>;
}
