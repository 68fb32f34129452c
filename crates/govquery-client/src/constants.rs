//! Constants for the GovQuery client

use std::time::Duration;

/// Service name used for tracing spans and cache instrumentation
pub const SERVICE_NAME: &str = "govquery-client";

/// Default backend base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default per-attempt request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default total number of attempts per operation
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Default linear backoff unit
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default log level when neither config nor `RUST_LOG` supply one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Health status synthesized when the backend cannot be reached
pub const STATUS_UNHEALTHY: &str = "unhealthy";

/// Content type sent on every backend request
pub const CONTENT_TYPE_JSON: &str = "application/json";
