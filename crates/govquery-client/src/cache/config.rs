//! Cache configuration types

use std::time::Duration;

/// Default maximum number of live entries
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Cache TTL configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtlConfig {
    /// TTL applied when a caller does not pass one
    pub default: Duration,
    /// TTL for a successful health check
    pub health: Duration,
    /// TTL for the synthesized unhealthy status after a failed health check
    pub health_error: Duration,
    /// TTL for schema list and schema descriptors
    pub schema: Duration,
}

impl CacheTtlConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            default: Duration::from_secs(300),
            health: Duration::from_secs(30),
            health_error: Duration::from_secs(5),
            schema: Duration::from_secs(300),
        }
    }
}

impl Default for CacheTtlConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Whether caching is enabled
    pub enabled: bool,
    /// TTL configuration
    pub ttl: CacheTtlConfig,
    /// Maximum entries for the in-memory cache (`None` means unbounded)
    pub max_entries: Option<usize>,
}

impl CacheConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            enabled: true,
            ttl: CacheTtlConfig::new(),
            max_entries: Some(DEFAULT_MAX_ENTRIES),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new()
    }
}
