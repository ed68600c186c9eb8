//! LRU Engine Module
//!
//! Process-local cache combining a lookup table with the arena recency index,
//! enforcing capacity by LRU eviction and TTL by lazy expiry.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::cache::{validate_key, Cache, CacheStats, Entry, RecencyIndex, SlotId};
use crate::error::{CacheError, Result};

// == LRU Engine ==
/// Capacity-bounded, time-expiring LRU cache safe to share across threads.
///
/// One mutex guards the lookup table and the recency index together, so no
/// caller can observe one structure updated without the other.
#[derive(Debug)]
pub struct LruEngine {
    /// Maximum number of resident entries, fixed at construction
    capacity: usize,
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    /// Key -> slot in the recency index
    table: HashMap<String, SlotId>,
    /// MRU (front) to LRU (back) ordering of resident entries
    index: RecencyIndex,
    stats: CacheStats,
}

impl Inner {
    fn evict_lru(&mut self) {
        if let Some(evicted) = self.index.pop_back() {
            self.table.remove(&evicted.key);
            self.stats.record_eviction();
            debug!(key = %evicted.key, "evicted least recently used entry");
        }
    }

    fn remove(&mut self, key: &str) -> Option<Entry> {
        let slot = self.table.remove(key)?;
        self.index.remove(slot)
    }
}

impl LruEngine {
    // == Constructor ==
    /// Creates an engine holding at most `capacity` entries.
    ///
    /// A capacity of zero yields a disabled cache: every set is evicted
    /// immediately and nothing is ever resident. Capacity is only an upper
    /// bound; storage grows with the resident entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Inner {
                table: HashMap::new(),
                index: RecencyIndex::new(),
                stats: CacheStats::new(),
            }),
        }
    }

    // == Set ==
    /// Stores a key-value pair expiring `ttl` from now.
    ///
    /// Overwriting refreshes value, expiry and recency without changing
    /// occupancy. Inserting a new key at capacity first evicts the least
    /// recently used entry, expired or not.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>, ttl: Duration) -> Result<()> {
        let key = key.into();
        validate_key(&key)?;

        let entry = Entry::new(key, value.into(), ttl);
        let mut inner = self.inner.lock();

        if self.capacity == 0 {
            inner.stats.record_eviction();
            debug!(key = %entry.key, "capacity is zero, entry evicted on insert");
            return Ok(());
        }

        let existing = inner.table.get(&entry.key).copied();
        if let Some(slot) = existing {
            match inner.index.replace(slot, entry) {
                Ok(_) => {
                    inner.index.move_to_front(slot);
                    return Ok(());
                }
                Err(entry) => {
                    // Table pointed at a freed slot; drop the stale mapping and insert anew
                    inner.table.remove(&entry.key);
                    self.insert_new(&mut inner, entry);
                    return Ok(());
                }
            }
        }

        self.insert_new(&mut inner, entry);
        Ok(())
    }

    fn insert_new(&self, inner: &mut Inner, entry: Entry) {
        while inner.index.len() >= self.capacity {
            inner.evict_lru();
        }

        let key = entry.key.clone();
        let slot = inner.index.push_front(entry);
        inner.table.insert(key, slot);
        let len = inner.index.len();
        inner.stats.set_total_entries(len);
    }

    // == Get ==
    /// Reads a live value and marks it most recently used.
    ///
    /// An expired entry is removed on the spot and reported as a miss.
    pub fn get(&self, key: &str) -> Result<String> {
        let mut inner = self.inner.lock();

        let slot = inner.table.get(key).copied();
        let Some(slot) = slot else {
            inner.stats.record_miss();
            return Err(CacheError::CacheMiss(key.to_string()));
        };

        let expired = match inner.index.get(slot) {
            Some(entry) => entry.is_expired_at(Instant::now()),
            None => true,
        };

        if expired {
            inner.remove(key);
            inner.stats.record_expiration();
            let len = inner.index.len();
            inner.stats.set_total_entries(len);
            debug!(key, "lazily expired entry on read");
            return Err(CacheError::CacheMiss(key.to_string()));
        }

        inner.index.move_to_front(slot);
        inner.stats.record_hit();
        inner
            .index
            .get(slot)
            .map(|entry| entry.value.clone())
            .ok_or_else(|| CacheError::CacheMiss(key.to_string()))
    }

    // == Delete ==
    /// Removes an entry. Deleting is not an access and does not touch recency.
    pub fn delete(&self, key: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        match inner.remove(key) {
            Some(_) => {
                let len = inner.index.len();
                inner.stats.set_total_entries(len);
                Ok(())
            }
            None => Err(CacheError::KeyNotFound(key.to_string())),
        }
    }

    // == Get All ==
    /// Snapshot of live entries. Expired entries are skipped but left in place.
    pub fn get_all(&self) -> HashMap<String, String> {
        let inner = self.inner.lock();
        let now = Instant::now();
        inner
            .index
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(_, entry)| (entry.key.clone(), entry.value.clone()))
            .collect()
    }

    // == Introspection ==
    /// Resident entries, including expired ones not yet reclaimed.
    pub fn len(&self) -> usize {
        self.inner.lock().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether `key` is resident. Neither bumps recency nor judges expiry.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().table.contains_key(key)
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        stats.set_total_entries(inner.index.len());
        stats
    }

    /// Verifies that the lookup table and recency index describe the same
    /// set of entries and that capacity holds.
    pub fn check_consistency(&self) -> std::result::Result<(), String> {
        let inner = self.inner.lock();

        if inner.index.len() > self.capacity {
            return Err(format!(
                "{} resident entries exceed capacity {}",
                inner.index.len(),
                self.capacity
            ));
        }
        if inner.table.len() != inner.index.len() {
            return Err(format!(
                "table has {} keys, index has {} entries",
                inner.table.len(),
                inner.index.len()
            ));
        }
        for (slot, entry) in inner.index.iter() {
            if inner.table.get(&entry.key) != Some(&slot) {
                return Err(format!("key {} in index is not mapped to its slot", entry.key));
            }
        }
        for (key, &slot) in &inner.table {
            match inner.index.get(slot) {
                Some(entry) if entry.key == *key => {}
                _ => return Err(format!("key {key} in table points at a foreign slot")),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Cache for LruEngine {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        LruEngine::set(self, key, value, ttl)
    }

    async fn get(&self, key: &str) -> Result<String> {
        LruEngine::get(self, key)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        LruEngine::delete(self, key)
    }

    async fn get_all(&self) -> Result<HashMap<String, String>> {
        Ok(LruEngine::get_all(self))
    }
}
