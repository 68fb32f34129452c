//! In-memory cache implementation with TTL support

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::time::Instant;

use super::error::CacheResult;
use super::key::CacheKey;
use super::provider::{CacheProvider, CacheStats};

/// Default TTL when neither the caller nor the builder supplies one
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Cache entry with value, storage stamp and lifetime
struct CacheEntry {
    value: Vec<u8>,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    /// Live iff `now - stored_at <= ttl`
    fn is_live_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) <= self.ttl
    }

    fn is_expired(&self) -> bool {
        !self.is_live_at(Instant::now())
    }
}

/// In-memory cache stats (internal)
#[derive(Default)]
struct InMemoryStats {
    hits: u64,
    misses: u64,
    sets: u64,
    deletes: u64,
    evictions: u64,
}

/// Thread-safe in-memory cache with lazy TTL expiry
///
/// Expired entries stay in the map until an access touches their key, or until
/// the `max_entries` bound is hit. At the bound, expired entries are purged first
/// and then the entry stored longest ago is evicted.
///
/// Clones share the same storage.
#[derive(Clone)]
pub struct InMemoryCache {
    store: Arc<RwLock<HashMap<String, CacheEntry>>>,
    stats: Arc<RwLock<InMemoryStats>>,
    max_entries: Option<usize>,
    default_ttl: Duration,
}

impl std::fmt::Debug for InMemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCache")
            .field("max_entries", &self.max_entries)
            .field("default_ttl", &self.default_ttl)
            .field("entry_count", &self.store.read().len())
            .finish_non_exhaustive()
    }
}

impl InMemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            stats: Arc::new(RwLock::new(InMemoryStats::default())),
            max_entries: None,
            default_ttl: DEFAULT_TTL,
        }
    }

    #[must_use]
    pub const fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }

    #[must_use]
    pub const fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Number of physically stored entries, expired ones included
    #[must_use]
    pub fn raw_len(&self) -> usize {
        self.store.read().len()
    }

    /// Look up a key, removing it if it has expired
    fn lookup(&self, key_str: &str) -> Option<Vec<u8>> {
        let now = Instant::now();
        {
            let store = self.store.read();
            match store.get(key_str) {
                None => return None,
                Some(entry) if entry.is_live_at(now) => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        // Re-check under the write lock: a concurrent `set` may have refreshed it
        let mut store = self.store.write();
        if store.get(key_str).is_some_and(CacheEntry::is_expired) {
            store.remove(key_str);
        }
        None
    }

    /// Make room for one new key; returns the number of evicted entries
    fn make_room(store: &mut HashMap<String, CacheEntry>, max: usize) -> u64 {
        let before = store.len();
        let now = Instant::now();
        store.retain(|_, entry| entry.is_live_at(now));

        while store.len() >= max {
            let Some(oldest) = store
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(k, _)| k.clone())
            else {
                break;
            };
            store.remove(&oldest);
        }

        (before - store.len()) as u64
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheProvider for InMemoryCache {
    async fn get(&self, key: &CacheKey) -> CacheResult<Option<Vec<u8>>> {
        let value = self.lookup(&key.to_key_string());

        let mut stats = self.stats.write();
        if value.is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
        drop(stats);

        Ok(value)
    }

    async fn set(&self, key: &CacheKey, value: &[u8], ttl: Option<Duration>) -> CacheResult<()> {
        let key_str = key.to_key_string();
        let entry = CacheEntry {
            value: value.to_vec(),
            stored_at: Instant::now(),
            ttl: ttl.unwrap_or(self.default_ttl),
        };

        let mut store = self.store.write();

        let evicted = match self.max_entries {
            Some(max) if store.len() >= max && !store.contains_key(&key_str) => {
                Self::make_room(&mut store, max)
            }
            _ => 0,
        };

        store.insert(key_str, entry);
        drop(store);

        let mut stats = self.stats.write();
        stats.sets += 1;
        stats.evictions += evicted;
        drop(stats);

        #[cfg(feature = "metrics")]
        {
            if evicted > 0 {
                crate::observability::record_cache_evictions(evicted);
            }
        }

        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> CacheResult<bool> {
        let key_str = key.to_key_string();
        let removed = self.store.write().remove(&key_str).is_some();

        if removed {
            self.stats.write().deletes += 1;
        }

        Ok(removed)
    }

    async fn exists(&self, key: &CacheKey) -> CacheResult<bool> {
        Ok(self.lookup(&key.to_key_string()).is_some())
    }

    async fn delete_by_prefix(&self, prefix: &str) -> CacheResult<u64> {
        let mut store = self.store.write();
        let before = store.len();
        store.retain(|k, _| !k.starts_with(prefix));
        let deleted = (before - store.len()) as u64;
        drop(store);

        if deleted > 0 {
            self.stats.write().deletes += deleted;
        }

        Ok(deleted)
    }

    async fn clear(&self) -> CacheResult<()> {
        self.store.write().clear();
        Ok(())
    }

    async fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let entry_count = self
            .store
            .read()
            .values()
            .filter(|e| e.is_live_at(now))
            .count() as u64;

        let stats = self.stats.read();
        CacheStats {
            hits: stats.hits,
            misses: stats.misses,
            sets: stats.sets,
            deletes: stats.deletes,
            evictions: stats.evictions,
            entry_count: Some(entry_count),
        }
    }
}
