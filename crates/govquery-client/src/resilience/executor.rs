//! Single-attempt request execution with a deadline

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

use super::RequestOutcome;
use crate::transport::{ApiRequest, Transport};

/// Runs one backend attempt under a timeout.
///
/// On expiry the transport future is dropped, which aborts the in-flight
/// HTTP request; a timed-out attempt never delivers a late result.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl RequestExecutor {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Get the configured timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute with the configured timeout
    pub async fn execute(&self, request: &ApiRequest) -> RequestOutcome<Value> {
        self.execute_with_timeout(request, self.timeout).await
    }

    /// Execute with a caller-supplied timeout
    pub async fn execute_with_timeout(
        &self,
        request: &ApiRequest,
        timeout: Duration,
    ) -> RequestOutcome<Value> {
        let started = Instant::now();

        let outcome = tokio::time::timeout(timeout, self.transport.send(request))
            .await
            .unwrap_or(RequestOutcome::Timeout(timeout));

        let elapsed = started.elapsed();
        tracing::debug!(
            http.method = request.endpoint.method().as_str(),
            http.route = request.endpoint.route(),
            outcome = outcome.kind(),
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "Backend attempt finished"
        );

        #[cfg(feature = "metrics")]
        {
            crate::observability::record_request(
                request.endpoint.method().as_str(),
                request.endpoint.route(),
                outcome.kind(),
                elapsed,
            );
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::transport::Endpoint;

    /// Transport that answers after a fixed delay
    #[derive(Debug)]
    struct SlowTransport {
        delay: Duration,
        completed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Transport for SlowTransport {
        async fn send(&self, _request: &ApiRequest) -> RequestOutcome<Value> {
            tokio::time::sleep(self.delay).await;
            self.completed.store(true, Ordering::SeqCst);
            RequestOutcome::Success(json!({ "status": "healthy" }))
        }
    }

    fn executor(delay: Duration, timeout: Duration) -> (RequestExecutor, Arc<AtomicBool>) {
        let completed = Arc::new(AtomicBool::new(false));
        let transport = SlowTransport {
            delay,
            completed: Arc::clone(&completed),
        };
        (RequestExecutor::new(Arc::new(transport), timeout), completed)
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_within_timeout() {
        let (executor, completed) = executor(Duration::from_millis(10), Duration::from_secs(1));

        let outcome = executor.execute(&ApiRequest::new(Endpoint::Health)).await;

        assert!(outcome.is_success());
        assert!(completed.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_timeout_aborts_attempt() {
        let (executor, completed) = executor(Duration::from_secs(5), Duration::from_millis(100));

        let outcome = executor.execute(&ApiRequest::new(Endpoint::Health)).await;
        assert_eq!(outcome, RequestOutcome::Timeout(Duration::from_millis(100)));

        // The dropped attempt never runs to completion
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(!completed.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_with_caller_timeout() {
        let (executor, _) = executor(Duration::from_millis(500), Duration::from_secs(30));
        assert_eq!(executor.timeout(), Duration::from_secs(30));

        let outcome = executor
            .execute_with_timeout(&ApiRequest::new(Endpoint::Health), Duration::from_millis(50))
            .await;

        assert!(outcome.is_timeout());
    }

    #[tokio::test]
    async fn test_execute_against_mock_backend() {
        use axum::Router;
        use axum::routing::get;

        use crate::test_support::spawn_backend;
        use crate::transport::HttpTransport;

        let app = Router::new().route(
            "/schemas",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                axum::Json(json!([]))
            }),
        );
        let transport = HttpTransport::new(spawn_backend(app).await).unwrap();
        let executor = RequestExecutor::new(Arc::new(transport), Duration::from_millis(100));

        let outcome = executor.execute(&ApiRequest::new(Endpoint::Schemas)).await;

        assert!(outcome.is_timeout());
    }
}
