//! TOML configuration file loading

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use super::builder::ConfigBuilder;
use crate::Result;
use crate::resilience::RetryMode;

/// Configuration file locations checked in order
const CONFIG_PATHS: &[&str] = &[
    "./govquery.toml",
    "~/.config/govquery/config.toml",
    "/etc/govquery/config.toml",
];

/// Find the first existing configuration file
pub fn find_config_file() -> Option<PathBuf> {
    for path_str in CONFIG_PATHS {
        let path = if path_str.starts_with('~') {
            if let Ok(home) = std::env::var("HOME") {
                PathBuf::from(path_str.replacen('~', &home, 1))
            } else {
                continue;
            }
        } else {
            PathBuf::from(path_str)
        };

        if path.exists() {
            return Some(path);
        }
    }
    None
}

/// Load configuration from a TOML file
pub fn load_from_file(path: &Path, builder: ConfigBuilder) -> Result<ConfigBuilder> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::Error::Config(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;

    let file_config: FileConfig = toml::from_str(&content).map_err(|e| {
        crate::Error::Config(format!(
            "Failed to parse config file {}: {}",
            path.display(),
            e
        ))
    })?;

    apply_file_config(builder, file_config)
}

fn apply_file_config(mut builder: ConfigBuilder, config: FileConfig) -> Result<ConfigBuilder> {
    if let Some(backend) = config.backend {
        if let Some(url_str) = backend.url {
            let url = Url::parse(&url_str)
                .map_err(|e| crate::Error::Config(format!("Invalid backend URL: {e}")))?;
            builder = builder.base_url(url);
        }

        if let Some(ms) = backend.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }

        if let Some(enabled) = backend.prevalidate_sql {
            builder = builder.prevalidate_sql(enabled);
        }
    }

    if let Some(retry) = config.retry {
        if let Some(attempts) = retry.attempts {
            builder = builder.retry_attempts(attempts);
        }

        if let Some(ms) = retry.base_delay_ms {
            builder = builder.retry_base_delay(Duration::from_millis(ms));
        }

        if let Some(mode) = retry.mode {
            builder = builder.retry_mode(mode);
        }
    }

    if let Some(cache) = config.cache {
        if let Some(enabled) = cache.enabled {
            builder = builder.cache_enabled(enabled);
        }

        if let Some(max) = cache.max_entries {
            builder = builder.cache_max_entries(Some(max));
        }

        if let Some(secs) = cache.default_ttl_secs {
            builder = builder.cache_default_ttl(Duration::from_secs(secs));
        }

        if let Some(secs) = cache.health_ttl_secs {
            builder = builder.cache_health_ttl(Duration::from_secs(secs));
        }

        if let Some(secs) = cache.health_error_ttl_secs {
            builder = builder.cache_health_error_ttl(Duration::from_secs(secs));
        }

        if let Some(secs) = cache.schema_ttl_secs {
            builder = builder.cache_schema_ttl(Duration::from_secs(secs));
        }
    }

    if let Some(obs) = config.observability {
        if let Some(name) = obs.service_name {
            builder = builder.service_name(name);
        }

        if let Some(level) = obs.log_level {
            builder = builder.log_level(level);
        }

        if let Some(json) = obs.json_logs {
            builder = builder.json_logs(json);
        }
    }

    Ok(builder)
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    backend: Option<BackendSection>,
    retry: Option<RetrySection>,
    cache: Option<CacheSection>,
    observability: Option<ObservabilitySection>,
}

#[derive(Debug, Deserialize)]
struct BackendSection {
    url: Option<String>,
    timeout_ms: Option<u64>,
    prevalidate_sql: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RetrySection {
    attempts: Option<u32>,
    base_delay_ms: Option<u64>,
    mode: Option<RetryMode>,
}

#[derive(Debug, Deserialize)]
struct CacheSection {
    enabled: Option<bool>,
    max_entries: Option<usize>,
    default_ttl_secs: Option<u64>,
    health_ttl_secs: Option<u64>,
    health_error_ttl_secs: Option<u64>,
    schema_ttl_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ObservabilitySection {
    service_name: Option<String>,
    log_level: Option<String>,
    json_logs: Option<bool>,
}
