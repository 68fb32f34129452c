//! Query client: the composition root over cache, retry, and transport

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::cache::{
    CacheKey, CacheNamespace, CacheProvider, CacheStats, CacheTtlConfig, create_cache,
};
use crate::config::ClientConfig;
use crate::helpers::{cache_lookup, cache_store, cached_or_fetch, decode, encode};
use crate::resilience::{RequestExecutor, RetryPolicy};
use crate::transport::{ApiRequest, Endpoint, HttpTransport, Transport};
use crate::types::{
    DeployResponse, ExecuteRequest, ExecuteResponse, HealthResponse, ParseSqlRequest,
    QueryRequest, QueryResponse, SchemaInfo,
};
use crate::validation::{SqlParseResult, parse_sql, validate_sql};
use crate::{Error, Result};

/// Client for the GovQuery backend.
///
/// Reads (`health_check`, `list_schemas`, `get_schema`) are cached; writes and
/// conversions always go to the backend. Every network call runs under the
/// configured retry policy and per-attempt timeout.
///
/// Concurrent misses on the same key each reach the backend; there is no
/// request coalescing.
///
/// Clones share the cache and the cancellation token. To cancel a single
/// operation, drop its future or run it on a [`QueryClient::scoped`] handle.
#[derive(Clone)]
pub struct QueryClient {
    executor: RequestExecutor,
    retry: RetryPolicy,
    cache: Arc<dyn CacheProvider>,
    ttl: CacheTtlConfig,
    prevalidate_sql: bool,
    cancel: CancellationToken,
}

impl fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryClient")
            .field("executor", &self.executor)
            .field("retry", &self.retry)
            .field("cache", &"<CacheProvider>")
            .field("ttl", &self.ttl)
            .field("prevalidate_sql", &self.prevalidate_sql)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl QueryClient {
    /// Build a client talking HTTP to `config.base_url`
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.base_url.clone())?;
        Ok(Self::with_parts(
            config,
            Arc::new(transport),
            create_cache(&config.cache),
        ))
    }

    /// Build a client over an explicit transport and cache
    #[must_use]
    pub fn with_parts(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        cache: Arc<dyn CacheProvider>,
    ) -> Self {
        Self {
            executor: RequestExecutor::new(transport, config.timeout),
            retry: config.retry,
            cache,
            ttl: config.cache.ttl,
            prevalidate_sql: config.prevalidate_sql,
            cancel: CancellationToken::new(),
        }
    }

    /// Backend health, cached for 30 s.
    ///
    /// Never fails on backend trouble: a terminal failure is reported as an
    /// `unhealthy` status carrying the error message, cached for 5 s so that
    /// repeated probes do not hammer a dead backend. Only cancellation errors.
    pub async fn health_check(&self) -> Result<HealthResponse> {
        let key = CacheKey::health();
        if let Some(health) = cache_lookup(self.cache.as_ref(), &key).await {
            return Ok(health);
        }

        match self
            .call::<HealthResponse>("health_check", ApiRequest::new(Endpoint::Health))
            .await
        {
            Ok(health) => {
                cache_store(self.cache.as_ref(), &key, &health, self.ttl.health).await;
                Ok(health)
            }
            Err(Error::Cancelled) => Err(Error::Cancelled),
            Err(e) => {
                tracing::warn!(error = %e, "Health check failed, reporting backend as unhealthy");
                let health = HealthResponse::unhealthy(e.to_string());
                cache_store(self.cache.as_ref(), &key, &health, self.ttl.health_error).await;
                Ok(health)
            }
        }
    }

    /// Whether the backend answered the last health check with a non-`unhealthy` status
    pub async fn is_available(&self) -> bool {
        self.health_check()
            .await
            .is_ok_and(|health| !health.is_unhealthy())
    }

    /// All schema descriptors, cached for 5 minutes
    pub async fn list_schemas(&self) -> Result<Vec<SchemaInfo>> {
        cached_or_fetch(
            self.cache.as_ref(),
            &CacheKey::schema_list(),
            self.ttl.schema,
            || self.call("list_schemas", ApiRequest::new(Endpoint::Schemas)),
        )
        .await
    }

    /// One schema descriptor by table code, cached for 5 minutes
    pub async fn get_schema(&self, table_code: &str) -> Result<SchemaInfo> {
        cached_or_fetch(
            self.cache.as_ref(),
            &CacheKey::schema(table_code),
            self.ttl.schema,
            || {
                self.call(
                    "get_schema",
                    ApiRequest::new(Endpoint::Schema(table_code.to_string())),
                )
            },
        )
        .await
    }

    /// Convert a natural-language question to SQL (full pipeline)
    pub async fn convert_to_sql(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let body = encode(request)?;
        self.call("convert_to_sql", ApiRequest::new(Endpoint::Convert).with_body(body))
            .await
    }

    /// Convert a natural-language question to SQL (lightweight pipeline)
    pub async fn convert_to_sql_simple(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let body = encode(request)?;
        self.call(
            "convert_to_sql_simple",
            ApiRequest::new(Endpoint::ConvertSimple).with_body(body),
        )
        .await
    }

    /// Execute SQL on the backend.
    ///
    /// With pre-validation enabled, SQL the local validator rejects fails with
    /// [`Error::InvalidSql`] before any request is made.
    pub async fn execute_sql(&self, sql: &str, max_rows: Option<u32>) -> Result<ExecuteResponse> {
        if self.prevalidate_sql {
            parse_sql(sql).map_err(|e| Error::InvalidSql(e.to_string()))?;
        }

        let body = encode(&ExecuteRequest {
            sql: sql.to_string(),
            max_rows,
        })?;
        self.call("execute_sql", ApiRequest::new(Endpoint::Execute).with_body(body))
            .await
    }

    /// Validate SQL with the backend's parser; the AST is passed through untyped
    pub async fn parse_sql_remote(&self, sql: &str) -> Result<SqlParseResult<Value>> {
        let body = encode(&ParseSqlRequest {
            sql: sql.to_string(),
        })?;
        self.call("parse_sql_remote", ApiRequest::new(Endpoint::ParseSql).with_body(body))
            .await
    }

    /// Ask the backend to deploy its model application
    pub async fn deploy(&self) -> Result<DeployResponse> {
        self.call("deploy", ApiRequest::new(Endpoint::Deploy)).await
    }

    /// Validate SQL locally. See [`crate::validation::validate_sql`].
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn validate_sql(&self, sql: &str) -> SqlParseResult {
        validate_sql(sql)
    }

    /// Drop the schema list and every cached schema descriptor.
    ///
    /// Returns the number of entries removed.
    pub async fn invalidate_schemas(&self) -> u64 {
        let prefix = format!("{}:", CacheNamespace::Schema.as_str());
        let mut removed = match self.cache.delete_by_prefix(&prefix).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to invalidate schema cache");
                0
            }
        };

        if let Ok(true) = self.cache.delete(&CacheKey::schema_list()).await {
            removed += 1;
        }

        tracing::debug!(removed, "Schema cache invalidated");
        removed
    }

    /// Drop every cached response
    pub async fn clear_cache(&self) {
        if let Err(e) = self.cache.clear().await {
            tracing::warn!(error = %e, "Failed to clear cache");
        }
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Handle sharing this client's cache and transport with its own child
    /// cancellation token.
    ///
    /// Cancelling the handle leaves the parent usable; cancelling the parent
    /// also cancels every scoped handle.
    #[must_use]
    pub fn scoped(&self) -> Self {
        Self {
            cancel: self.cancel.child_token(),
            ..self.clone()
        }
    }

    /// Abort in-flight operations and skip pending retries.
    ///
    /// Cancellation is permanent for this client and every clone of it;
    /// later network operations fail with [`Error::Cancelled`]. Cache hits
    /// are still served. Use [`QueryClient::scoped`] to cancel one
    /// operation without shutting down the shared client.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token observed by every operation of this client
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    async fn call<T: DeserializeOwned>(&self, operation: &str, request: ApiRequest) -> Result<T> {
        let value = self
            .retry
            .run(operation, &self.cancel, |_attempt| {
                self.executor.execute(&request)
            })
            .await?;
        decode(value)
    }
}
