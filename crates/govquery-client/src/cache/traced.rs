//! Traced cache wrapper for observability

use std::time::Duration;

use async_trait::async_trait;
use tracing::Instrument;

use super::error::CacheResult;
use super::key::CacheKey;
use super::provider::{CacheProvider, CacheStats};

/// Wrapper that adds tracing to any `CacheProvider`
///
/// Spans are debug-level: query conversion keys are hashes, but schema keys
/// carry table codes verbatim.
pub struct TracedCache<C> {
    inner: C,
    service_name: String,
}

impl<C: std::fmt::Debug> std::fmt::Debug for TracedCache<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TracedCache")
            .field("inner", &self.inner)
            .field("service_name", &self.service_name)
            .finish()
    }
}

impl<C: Clone> Clone for TracedCache<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            service_name: self.service_name.clone(),
        }
    }
}

impl<C> TracedCache<C> {
    pub fn new(cache: C, service_name: impl Into<String>) -> Self {
        Self {
            inner: cache,
            service_name: service_name.into(),
        }
    }

    /// Access the wrapped provider
    pub const fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: CacheProvider> CacheProvider for TracedCache<C> {
    async fn get(&self, key: &CacheKey) -> CacheResult<Option<Vec<u8>>> {
        let span = tracing::debug_span!(
            "cache.get",
            cache.service = %self.service_name,
            cache.key = %key,
            cache.namespace = key.namespace().as_str(),
        );

        let result = self.inner.get(key).instrument(span).await;

        match &result {
            Ok(Some(data)) => {
                tracing::debug!(
                    cache.result = "hit",
                    cache.key = %key,
                    cache.size_bytes = data.len(),
                );
            }
            Ok(None) => {
                tracing::debug!(cache.result = "miss", cache.key = %key);
            }
            Err(e) => {
                tracing::warn!(cache.result = "error", cache.key = %key, error = %e);
            }
        }

        #[cfg(feature = "metrics")]
        {
            match &result {
                Ok(Some(_)) => crate::observability::record_cache_hit(key.namespace().as_str()),
                Ok(None) => crate::observability::record_cache_miss(key.namespace().as_str()),
                Err(_) => {}
            }
        }

        result
    }

    async fn set(&self, key: &CacheKey, value: &[u8], ttl: Option<Duration>) -> CacheResult<()> {
        let span = tracing::debug_span!(
            "cache.set",
            cache.service = %self.service_name,
            cache.key = %key,
            cache.namespace = key.namespace().as_str(),
            cache.value_size = value.len(),
            cache.ttl_ms = ttl.map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
        );

        let result = self.inner.set(key, value, ttl).instrument(span).await;

        if let Err(ref e) = result {
            tracing::warn!(
                cache.operation = "set",
                cache.key = %key,
                error = %e,
            );
        }

        result
    }

    async fn delete(&self, key: &CacheKey) -> CacheResult<bool> {
        let span = tracing::debug_span!(
            "cache.delete",
            cache.service = %self.service_name,
            cache.key = %key,
            cache.namespace = key.namespace().as_str(),
        );

        let result = self.inner.delete(key).instrument(span).await;

        match &result {
            Ok(deleted) => {
                tracing::debug!(
                    cache.operation = "delete",
                    cache.key = %key,
                    cache.deleted = deleted,
                );
            }
            Err(e) => {
                tracing::warn!(
                    cache.operation = "delete",
                    cache.key = %key,
                    error = %e,
                );
            }
        }

        result
    }

    async fn exists(&self, key: &CacheKey) -> CacheResult<bool> {
        let span = tracing::debug_span!(
            "cache.exists",
            cache.service = %self.service_name,
            cache.key = %key,
            cache.namespace = key.namespace().as_str(),
        );

        self.inner.exists(key).instrument(span).await
    }

    async fn delete_by_prefix(&self, prefix: &str) -> CacheResult<u64> {
        let span = tracing::debug_span!(
            "cache.delete_by_prefix",
            cache.service = %self.service_name,
            cache.prefix = prefix,
        );

        let result = self.inner.delete_by_prefix(prefix).instrument(span).await;

        match &result {
            Ok(count) => {
                tracing::debug!(
                    cache.operation = "delete_by_prefix",
                    cache.prefix = prefix,
                    cache.deleted_count = count,
                );
            }
            Err(e) => {
                tracing::warn!(
                    cache.operation = "delete_by_prefix",
                    cache.prefix = prefix,
                    error = %e,
                );
            }
        }

        result
    }

    async fn clear(&self) -> CacheResult<()> {
        let span = tracing::debug_span!("cache.clear", cache.service = %self.service_name);

        let result = self.inner.clear().instrument(span).await;

        match &result {
            Ok(()) => tracing::debug!(cache.operation = "clear"),
            Err(e) => tracing::warn!(cache.operation = "clear", error = %e),
        }

        result
    }

    async fn stats(&self) -> CacheStats {
        self.inner.stats().await
    }
}
