//! Helper utilities for the query client

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::{CacheKey, CacheProvider};
use crate::{Error, Result};

/// Decode a backend JSON payload into its wire type.
///
/// A 2xx body of the wrong shape is reported as a transport failure, the same
/// as a body that is not JSON at all.
pub fn decode<T: DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| Error::Transport(format!("Unexpected response body: {e}")))
}

/// Encode a request body as JSON.
pub fn encode<T: Serialize>(body: &T) -> Result<serde_json::Value> {
    serde_json::to_value(body)
        .map_err(|e| Error::Transport(format!("Failed to encode request body: {e}")))
}

/// Read a typed value from cache, if present and decodable.
/// Cache errors are logged but never propagate.
pub async fn cache_lookup<T: DeserializeOwned>(
    cache: &dyn CacheProvider,
    key: &CacheKey,
) -> Option<T> {
    match cache.get(key).await {
        Ok(Some(data)) => match serde_json::from_slice::<T>(&data) {
            Ok(value) => {
                tracing::debug!(
                    cache.result = "hit",
                    cache.key = %key,
                    "Returning cached value"
                );
                Some(value)
            }
            Err(e) => {
                tracing::warn!(
                    cache.key = %key,
                    error = %e,
                    "Cache deserialization failed, fetching from source"
                );
                None
            }
        },
        Ok(None) => {
            tracing::debug!(
                cache.result = "miss",
                cache.key = %key,
                "Cache miss, fetching from source"
            );
            None
        }
        Err(e) => {
            tracing::warn!(
                cache.key = %key,
                error = %e,
                "Cache get failed, fetching from source"
            );
            None
        }
    }
}

/// Store a typed value in cache (fire-and-forget, errors logged but not propagated)
pub async fn cache_store<T: Serialize>(
    cache: &dyn CacheProvider,
    key: &CacheKey,
    value: &T,
    ttl: Duration,
) {
    match serde_json::to_vec(value) {
        Ok(data) => {
            if let Err(e) = cache.set(key, &data, Some(ttl)).await {
                tracing::warn!(
                    cache.key = %key,
                    error = %e,
                    "Failed to cache value"
                );
            }
        }
        Err(e) => {
            tracing::warn!(
                cache.key = %key,
                error = %e,
                "Failed to serialize value for caching"
            );
        }
    }
}

/// Try to get a value from cache, falling back to a fetch function.
/// Only successful fetches are stored.
pub async fn cached_or_fetch<T, F, Fut>(
    cache: &dyn CacheProvider,
    key: &CacheKey,
    ttl: Duration,
    fetch: F,
) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if let Some(value) = cache_lookup(cache, key).await {
        return Ok(value);
    }

    let value = fetch().await?;
    cache_store(cache, key, &value, ttl).await;

    Ok(value)
}
