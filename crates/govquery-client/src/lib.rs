//! Resilient client for the GovQuery natural-language-to-SQL backend

pub mod cache;
mod client;
pub mod config;
mod constants;
mod error;
mod helpers;
pub mod observability;
pub mod resilience;
#[cfg(test)]
mod test_support;
pub mod transport;
pub mod types;
pub mod validation;

pub use cache::{
    CacheConfig, CacheError, CacheKey, CacheNamespace, CacheProvider, CacheResult, CacheStats,
    CacheTtlConfig, InMemoryCache, NoopCache, TracedCache, create_cache,
};
pub use client::QueryClient;
pub use config::{ClientConfig, ConfigBuilder, TelemetryConfig};
pub use error::{Error, Result};
pub use resilience::{RequestExecutor, RequestOutcome, RetryMode, RetryPolicy};
pub use transport::{ApiRequest, Endpoint, HttpTransport, Transport};
pub use types::*;
pub use validation::{
    ShallowAst, SqlParseResult, SqlValidationError, ValidationSummary, format_sql, validate_sql,
    validate_sql_summary,
};
