//! Configuration builder

use std::num::NonZeroU32;
use std::time::Duration;

use url::Url;

use crate::Error;
use crate::cache::{CacheConfig, CacheTtlConfig};
use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_LOG_LEVEL, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_BASE_DELAY,
    DEFAULT_TIMEOUT, SERVICE_NAME,
};
use crate::resilience::{RetryMode, RetryPolicy};

/// Client configuration, immutable once built
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    /// Per-attempt request timeout
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub cache: CacheConfig,
    /// Run the local SQL validator before `execute_sql`
    pub prevalidate_sql: bool,
    pub telemetry: TelemetryConfig,
}

impl ClientConfig {
    #[must_use]
    pub const fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub const fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    #[must_use]
    pub const fn cache(&self) -> &CacheConfig {
        &self.cache
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub log_level: String,
    pub json_logs: bool,
}

/// Configuration builder with fluent API
#[derive(Debug)]
pub struct ConfigBuilder {
    base_url: Option<Url>,
    timeout: Duration,
    retry_attempts: u32,
    retry_base_delay: Duration,
    retry_mode: RetryMode,
    cache: CacheConfig,
    prevalidate_sql: bool,
    telemetry: TelemetryConfig,
}

impl ConfigBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
            retry_mode: RetryMode::All,
            cache: CacheConfig::new(),
            prevalidate_sql: false,
            telemetry: TelemetryConfig {
                service_name: String::new(),
                log_level: String::new(),
                json_logs: false,
            },
        }
    }

    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total attempts per operation, including the first
    #[must_use]
    pub const fn retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    /// Linear backoff unit: the wait after attempt `n` is `n * delay`
    #[must_use]
    pub const fn retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    #[must_use]
    pub const fn retry_mode(mut self, mode: RetryMode) -> Self {
        self.retry_mode = mode;
        self
    }

    #[must_use]
    pub const fn prevalidate_sql(mut self, enabled: bool) -> Self {
        self.prevalidate_sql = enabled;
        self
    }

    #[must_use]
    pub fn service_name(mut self, name: String) -> Self {
        self.telemetry.service_name = name;
        self
    }

    #[must_use]
    pub fn log_level(mut self, level: String) -> Self {
        self.telemetry.log_level = level;
        self
    }

    #[must_use]
    pub const fn json_logs(mut self, enabled: bool) -> Self {
        self.telemetry.json_logs = enabled;
        self
    }

    // Cache configuration methods

    /// Enable caching (enabled by default)
    #[must_use]
    pub const fn cache_enabled(mut self, enabled: bool) -> Self {
        self.cache.enabled = enabled;
        self
    }

    /// Set cache TTL configuration
    #[must_use]
    pub const fn cache_ttl(mut self, ttl: CacheTtlConfig) -> Self {
        self.cache.ttl = ttl;
        self
    }

    /// Set default cache TTL
    #[must_use]
    pub const fn cache_default_ttl(mut self, ttl: Duration) -> Self {
        self.cache.ttl.default = ttl;
        self
    }

    /// Set TTL for a successful health check
    #[must_use]
    pub const fn cache_health_ttl(mut self, ttl: Duration) -> Self {
        self.cache.ttl.health = ttl;
        self
    }

    /// Set TTL for the unhealthy status after a failed health check
    #[must_use]
    pub const fn cache_health_error_ttl(mut self, ttl: Duration) -> Self {
        self.cache.ttl.health_error = ttl;
        self
    }

    /// Set schema list and schema descriptor TTL
    #[must_use]
    pub const fn cache_schema_ttl(mut self, ttl: Duration) -> Self {
        self.cache.ttl.schema = ttl;
        self
    }

    /// Set maximum cache entries (`None` for unbounded)
    #[must_use]
    pub const fn cache_max_entries(mut self, max: Option<usize>) -> Self {
        self.cache.max_entries = max;
        self
    }

    /// Build the configuration
    pub fn build(self) -> crate::Result<ClientConfig> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)
                .map_err(|e| Error::Config(format!("Invalid default backend URL: {e}")))?,
        };

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "Backend URL must use http or https, got: {}",
                base_url.scheme()
            )));
        }

        if self.timeout.is_zero() {
            return Err(Error::Config("timeout must be greater than zero".into()));
        }

        let attempts = NonZeroU32::new(self.retry_attempts)
            .ok_or_else(|| Error::Config("retry attempts must be at least 1".into()))?;

        if self.cache.max_entries == Some(0) {
            return Err(Error::Config(
                "cache max_entries must be greater than zero".into(),
            ));
        }

        let service_name = if self.telemetry.service_name.is_empty() {
            SERVICE_NAME.to_string()
        } else {
            self.telemetry.service_name
        };

        let log_level = if self.telemetry.log_level.is_empty() {
            DEFAULT_LOG_LEVEL.to_string()
        } else {
            self.telemetry.log_level
        };

        Ok(ClientConfig {
            base_url,
            timeout: self.timeout,
            retry: RetryPolicy::new(attempts, self.retry_base_delay).with_mode(self.retry_mode),
            cache: self.cache,
            prevalidate_sql: self.prevalidate_sql,
            telemetry: TelemetryConfig {
                service_name,
                log_level,
                json_logs: self.telemetry.json_logs,
            },
        })
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DEFAULT_MAX_ENTRIES;

    #[test]
    fn test_builder_defaults() {
        let config = ConfigBuilder::new().build().unwrap();

        assert_eq!(config.base_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retry.max_attempts().get(), 3);
        assert_eq!(config.retry.base_delay(), Duration::from_secs(1));
        assert_eq!(config.retry.mode(), RetryMode::All);
        assert!(!config.prevalidate_sql);
        assert_eq!(config.telemetry.service_name, "govquery-client");
        assert_eq!(config.telemetry.log_level, "info");
        assert!(!config.telemetry.json_logs);
    }

    #[test]
    fn test_builder_cache_defaults() {
        let config = ConfigBuilder::new().build().unwrap();
        assert!(config.cache.enabled);
        assert_eq!(config.cache.max_entries, Some(DEFAULT_MAX_ENTRIES));
        assert_eq!(config.cache.ttl.health, Duration::from_secs(30));
        assert_eq!(config.cache.ttl.health_error, Duration::from_secs(5));
        assert_eq!(config.cache.ttl.schema, Duration::from_secs(300));
    }

    #[test]
    fn test_builder_overrides() {
        let config = ClientConfig::builder()
            .base_url(Url::parse("https://govquery.example.org/api/").unwrap())
            .timeout(Duration::from_secs(5))
            .retry_attempts(5)
            .retry_base_delay(Duration::from_millis(200))
            .retry_mode(RetryMode::TransientOnly)
            .prevalidate_sql(true)
            .cache_enabled(false)
            .cache_schema_ttl(Duration::from_secs(60))
            .cache_max_entries(None)
            .log_level("debug".into())
            .json_logs(true)
            .build()
            .unwrap();

        assert_eq!(config.base_url().host_str(), Some("govquery.example.org"));
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.retry().max_attempts().get(), 5);
        assert_eq!(config.retry().delay_after(2), Duration::from_millis(400));
        assert_eq!(config.retry().mode(), RetryMode::TransientOnly);
        assert!(config.prevalidate_sql);
        assert!(!config.cache().enabled);
        assert_eq!(config.cache().ttl.schema, Duration::from_secs(60));
        assert!(config.cache().max_entries.is_none());
        assert_eq!(config.telemetry.log_level, "debug");
        assert!(config.telemetry.json_logs);
    }

    #[test]
    fn test_builder_rejects_non_http_url() {
        let err = ConfigBuilder::new()
            .base_url(Url::parse("ftp://example.org").unwrap())
            .build()
            .unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("ftp"));
    }

    #[test]
    fn test_builder_rejects_zero_timeout() {
        let err = ConfigBuilder::new()
            .timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_builder_rejects_zero_attempts() {
        let err = ConfigBuilder::new().retry_attempts(0).build().unwrap_err();
        assert!(err.to_string().contains("retry attempts"));
    }

    #[test]
    fn test_builder_rejects_zero_max_entries() {
        let err = ConfigBuilder::new()
            .cache_max_entries(Some(0))
            .build()
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_builder_cache_ttl_setters() {
        let config = ConfigBuilder::new()
            .cache_default_ttl(Duration::from_secs(1))
            .cache_health_ttl(Duration::from_secs(2))
            .cache_health_error_ttl(Duration::from_secs(3))
            .build()
            .unwrap();

        assert_eq!(config.cache.ttl.default, Duration::from_secs(1));
        assert_eq!(config.cache.ttl.health, Duration::from_secs(2));
        assert_eq!(config.cache.ttl.health_error, Duration::from_secs(3));

        let replaced = ConfigBuilder::new()
            .cache_ttl(CacheTtlConfig::default())
            .build()
            .unwrap();
        assert_eq!(replaced.cache.ttl, CacheTtlConfig::default());
    }
}
