//! Cache provider trait definition

use std::time::Duration;

use async_trait::async_trait;

use super::error::CacheResult;
use super::key::CacheKey;

/// Cache statistics for metrics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    pub evictions: u64,
    pub entry_count: Option<u64>,
}

impl CacheStats {
    /// Fraction of reads served from cache, `None` before the first read
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> Option<f64> {
        let reads = self.hits + self.misses;
        (reads > 0).then(|| self.hits as f64 / reads as f64)
    }
}

/// Async cache provider trait
///
/// Liveness is re-checked on every access; implementors must not rely on a
/// background sweep. All operations are async so that a remote backend can
/// implement the same seam.
#[async_trait]
pub trait CacheProvider: Send + Sync {
    /// Get a live value; an expired entry is removed and reported as absent
    async fn get(&self, key: &CacheKey) -> CacheResult<Option<Vec<u8>>>;

    /// Set a value, overwriting any previous entry. `None` uses the default TTL.
    async fn set(&self, key: &CacheKey, value: &[u8], ttl: Option<Duration>) -> CacheResult<()>;

    /// Delete a key from cache
    async fn delete(&self, key: &CacheKey) -> CacheResult<bool>;

    /// Check if a live entry exists, with the same expiry side effect as `get`
    async fn exists(&self, key: &CacheKey) -> CacheResult<bool>;

    /// Delete all keys matching a namespace prefix
    async fn delete_by_prefix(&self, prefix: &str) -> CacheResult<u64>;

    /// Clear entire cache
    async fn clear(&self) -> CacheResult<()>;

    /// Get cache statistics for observability
    async fn stats(&self) -> CacheStats;
}
