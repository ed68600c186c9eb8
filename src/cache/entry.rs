//! Cache Entry Module
//!
//! Defines a single resident record with its absolute expiry instant.

use std::time::{Duration, Instant};

/// Longest lifetime an entry can be given; larger TTLs are clamped to it.
pub const MAX_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 100);

// == Entry ==
/// A key, its value and the instant after which it is logically absent.
///
/// Entries are replaced wholesale on refresh rather than mutated field by
/// field, so a reader never sees a new value paired with an old expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The cache key
    pub key: String,
    /// The stored value
    pub value: String,
    /// Expiry instant; the entry is absent at or after this point
    pub expires_at: Instant,
}

impl Entry {
    // == Constructor ==
    /// Creates an entry that expires `ttl` from now.
    pub fn new(key: String, value: String, ttl: Duration) -> Self {
        Self {
            key,
            value,
            expires_at: expiry_from(Instant::now(), ttl),
        }
    }

    /// Creates an entry with an explicit expiry instant.
    #[cfg(test)]
    pub fn with_expiry(key: String, value: String, expires_at: Instant) -> Self {
        Self {
            key,
            value,
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has expired relative to `now`.
    ///
    /// An entry whose expiry equals `now` is already expired.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Checks whether the entry has expired.
    #[cfg(test)]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    // == Time To Live ==
    /// Remaining lifetime, saturating at zero once expired.
    #[cfg(test)]
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

/// Computes `now + ttl`, clamping absurdly large TTLs instead of overflowing.
pub(crate) fn expiry_from(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl).unwrap_or_else(|| now + MAX_TTL)
}
