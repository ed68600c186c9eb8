//! Cache Module
//!
//! The local LRU engine and the contract it shares with remote backends.

mod contract;
mod engine;
mod entry;
mod lru;
mod stats;


use crate::error::{CacheError, Result};

// Re-export public types
pub use contract::Cache;
pub use engine::LruEngine;
pub use entry::{Entry, MAX_TTL};
pub use lru::{RecencyIndex, SlotId};
pub use stats::CacheStats;

// == Public Constants ==
/// Maximum allowed key length in bytes (memcached's own limit)
pub const MAX_KEY_LENGTH: usize = 250;

/// Rejects keys no backend could store: empty or longer than [`MAX_KEY_LENGTH`].
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidRequest("Key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidRequest(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}
