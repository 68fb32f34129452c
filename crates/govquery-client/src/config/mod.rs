//! Configuration management
//!
//! Sources, lowest to highest precedence: defaults, TOML file, environment.
//! The binary applies its CLI flags on top of the returned builder.

mod builder;
mod env;
mod file;

pub use builder::{ClientConfig, ConfigBuilder, TelemetryConfig};

use crate::Result;

/// Load configuration from the first config file found, then the environment
pub fn load_config() -> Result<ConfigBuilder> {
    let mut builder = ConfigBuilder::new();

    if let Some(path) = file::find_config_file() {
        tracing::info!("Loading configuration from {}", path.display());
        builder = file::load_from_file(&path, builder)?;
    }

    builder = env::load_from_env(builder)?;

    Ok(builder)
}

/// Load configuration from a specific file path, then the environment
pub fn load_config_from_path(path: &std::path::Path) -> Result<ConfigBuilder> {
    let mut builder = ConfigBuilder::new();

    builder = file::load_from_file(path, builder)?;

    builder = env::load_from_env(builder)?;

    Ok(builder)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use tempfile::NamedTempFile;

    use super::env::testing::with_env_vars;
    use super::*;

    #[test]
    fn test_load_config_no_file() {
        with_env_vars(&[], || {
            assert!(load_config().is_ok());
        });
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[backend]\nurl = \"http://from-file:8000\"\ntimeout_ms = 4000\n")
            .unwrap();
        file.flush().unwrap();

        with_env_vars(&[("GOVQUERY_BACKEND_URL", "http://from-env:8000")], || {
            let config = load_config_from_path(file.path())
                .unwrap()
                .build()
                .unwrap();
            assert_eq!(config.base_url.host_str(), Some("from-env"));
            assert_eq!(config.timeout, Duration::from_secs(4));
        });
    }
}
