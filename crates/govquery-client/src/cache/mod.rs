//! Response cache for backend reads
//!
//! Provides pluggable cache backends with a unified async interface. Entries
//! are opaque bytes with a per-entry TTL; liveness is checked lazily on access.
//!
//! # Available Backends
//!
//! - [`NoopCache`] - No-op implementation (caching disabled)
//! - [`InMemoryCache`] - Thread-safe in-memory cache with TTL support
//!
//! # Observability
//!
//! Wrap any cache with [`TracedCache`] to add tracing spans and logging.
//!
//! # Staleness
//!
//! Schema descriptors are cached for 5 minutes by default. A schema deployed
//! on the backend may not be visible until the entry expires; call
//! [`QueryClient::invalidate_schemas`](crate::QueryClient::invalidate_schemas)
//! to drop them early.

mod config;
mod error;
mod key;
mod memory;
mod noop;
mod provider;
mod traced;

use std::sync::Arc;

pub use config::{CacheConfig, CacheTtlConfig, DEFAULT_MAX_ENTRIES};
pub use error::{CacheError, CacheResult};
pub use key::{CacheKey, CacheNamespace};
pub use memory::{DEFAULT_TTL, InMemoryCache};
pub use noop::NoopCache;
pub use provider::{CacheProvider, CacheStats};
pub use traced::TracedCache;

use crate::constants::SERVICE_NAME;

/// Create a cache provider based on configuration
#[must_use]
pub fn create_cache(config: &CacheConfig) -> Arc<dyn CacheProvider> {
    if !config.enabled {
        return Arc::new(NoopCache::new());
    }

    let mut cache = InMemoryCache::new().with_default_ttl(config.ttl.default);

    if let Some(max) = config.max_entries {
        cache = cache.with_max_entries(max);
    }

    Arc::new(TracedCache::new(cache, SERVICE_NAME))
}
