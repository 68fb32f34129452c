//! Environment variable loading for configuration

use std::env;
use std::time::Duration;

use url::Url;

use super::builder::ConfigBuilder;
use crate::Result;
use crate::resilience::RetryMode;

/// Environment variable names
mod vars {
    pub const BACKEND_URL: &str = "GOVQUERY_BACKEND_URL";
    pub const TIMEOUT_MS: &str = "GOVQUERY_TIMEOUT_MS";
    pub const RETRY_ATTEMPTS: &str = "GOVQUERY_RETRY_ATTEMPTS";
    pub const RETRY_BASE_DELAY_MS: &str = "GOVQUERY_RETRY_BASE_DELAY_MS";
    pub const RETRY_MODE: &str = "GOVQUERY_RETRY_MODE";
    pub const CACHE_ENABLED: &str = "GOVQUERY_CACHE_ENABLED";
    pub const CACHE_MAX_ENTRIES: &str = "GOVQUERY_CACHE_MAX_ENTRIES";
    pub const PREVALIDATE_SQL: &str = "GOVQUERY_PREVALIDATE_SQL";
    pub const LOG_LEVEL: &str = "GOVQUERY_LOG_LEVEL";
    pub const JSON_LOGS: &str = "GOVQUERY_JSON_LOGS";

    #[cfg(test)]
    pub const ALL: &[&str] = &[
        BACKEND_URL,
        TIMEOUT_MS,
        RETRY_ATTEMPTS,
        RETRY_BASE_DELAY_MS,
        RETRY_MODE,
        CACHE_ENABLED,
        CACHE_MAX_ENTRIES,
        PREVALIDATE_SQL,
        LOG_LEVEL,
        JSON_LOGS,
    ];
}

/// Load configuration from environment variables
///
/// Unparsable numbers are ignored. A malformed URL or retry mode is an error.
pub fn load_from_env(mut builder: ConfigBuilder) -> Result<ConfigBuilder> {
    if let Ok(url_str) = env::var(vars::BACKEND_URL) {
        let url = Url::parse(&url_str)
            .map_err(|e| crate::Error::Config(format!("Invalid {}: {}", vars::BACKEND_URL, e)))?;
        builder = builder.base_url(url);
    }

    if let Ok(timeout_str) = env::var(vars::TIMEOUT_MS)
        && let Ok(ms) = timeout_str.parse::<u64>()
    {
        builder = builder.timeout(Duration::from_millis(ms));
    }

    // Retry
    if let Ok(attempts_str) = env::var(vars::RETRY_ATTEMPTS)
        && let Ok(attempts) = attempts_str.parse::<u32>()
    {
        builder = builder.retry_attempts(attempts);
    }

    if let Ok(delay_str) = env::var(vars::RETRY_BASE_DELAY_MS)
        && let Ok(ms) = delay_str.parse::<u64>()
    {
        builder = builder.retry_base_delay(Duration::from_millis(ms));
    }

    if let Ok(mode) = env::var(vars::RETRY_MODE) {
        builder = builder.retry_mode(mode.parse::<RetryMode>()?);
    }

    // Cache
    if let Ok(val) = env::var(vars::CACHE_ENABLED) {
        builder = builder.cache_enabled(parse_bool(&val));
    }

    if let Ok(max_str) = env::var(vars::CACHE_MAX_ENTRIES)
        && let Ok(max) = max_str.parse::<usize>()
    {
        builder = builder.cache_max_entries(Some(max));
    }

    if let Ok(val) = env::var(vars::PREVALIDATE_SQL) {
        builder = builder.prevalidate_sql(parse_bool(&val));
    }

    // Telemetry
    if let Ok(level) = env::var(vars::LOG_LEVEL) {
        builder = builder.log_level(level);
    }

    if let Ok(val) = env::var(vars::JSON_LOGS) {
        builder = builder.json_logs(parse_bool(&val));
    }

    Ok(builder)
}

fn parse_bool(s: &str) -> bool {
    matches!(s.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}
