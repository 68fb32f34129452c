//! Prometheus metrics for the GovQuery client

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::Result;
use crate::error::Error;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
static START_TIME: OnceLock<Instant> = OnceLock::new();

// Process metrics
const METRIC_UPTIME: &str = "govquery_client_uptime_seconds";
const METRIC_INFO: &str = "govquery_client_info";

// Request metrics
const METRIC_REQUESTS: &str = "govquery_client_requests_total";
const METRIC_REQUEST_DURATION: &str = "govquery_client_request_duration_seconds";
const METRIC_RETRIES: &str = "govquery_client_retries_total";

// Cache metrics
const METRIC_CACHE_HITS: &str = "govquery_client_cache_hits_total";
const METRIC_CACHE_MISSES: &str = "govquery_client_cache_misses_total";
const METRIC_CACHE_EVICTIONS: &str = "govquery_client_cache_evictions_total";

/// Initialize Prometheus metrics recorder.
pub fn init_metrics() -> Result<()> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| Error::Config(format!("Failed to install metrics recorder: {e}")))?;

    PROMETHEUS_HANDLE.set(handle).ok();
    START_TIME.set(Instant::now()).ok();

    register_metrics();
    tracing::info!("Prometheus metrics initialized");
    Ok(())
}

fn register_metrics() {
    describe_gauge!(METRIC_UPTIME, "Process uptime in seconds");
    describe_gauge!(METRIC_INFO, "Client information (always 1)");

    describe_counter!(METRIC_REQUESTS, "Backend attempts by endpoint and outcome");
    describe_histogram!(
        METRIC_REQUEST_DURATION,
        "Backend attempt duration in seconds"
    );
    describe_counter!(METRIC_RETRIES, "Retries scheduled after a failed attempt");

    describe_counter!(METRIC_CACHE_HITS, "Total cache hits");
    describe_counter!(METRIC_CACHE_MISSES, "Total cache misses");
    describe_counter!(METRIC_CACHE_EVICTIONS, "Entries evicted to honor the size bound");

    gauge!(
        METRIC_INFO,
        "version" => env!("CARGO_PKG_VERSION"),
    )
    .set(1.0);
}

/// Render metrics in Prometheus text format.
#[must_use]
pub fn render_metrics() -> String {
    if let Some(start) = START_TIME.get() {
        gauge!(METRIC_UPTIME).set(start.elapsed().as_secs_f64());
    }

    PROMETHEUS_HANDLE
        .get()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}

/// Record one backend attempt.
pub fn record_request(method: &str, route: &str, outcome: &str, elapsed: Duration) {
    counter!(
        METRIC_REQUESTS,
        "method" => method.to_owned(),
        "route" => route.to_owned(),
        "outcome" => outcome.to_owned(),
    )
    .increment(1);

    histogram!(
        METRIC_REQUEST_DURATION,
        "method" => method.to_owned(),
        "route" => route.to_owned(),
    )
    .record(elapsed.as_secs_f64());
}

/// Record a scheduled retry.
pub fn record_retry(operation: &str) {
    counter!(METRIC_RETRIES, "operation" => operation.to_owned()).increment(1);
}

/// Record a cache hit.
pub fn record_cache_hit(namespace: &str) {
    counter!(METRIC_CACHE_HITS, "namespace" => namespace.to_owned()).increment(1);
}

/// Record a cache miss.
pub fn record_cache_miss(namespace: &str) {
    counter!(METRIC_CACHE_MISSES, "namespace" => namespace.to_owned()).increment(1);
}

/// Record entries evicted by the size bound.
pub fn record_cache_evictions(count: u64) {
    counter!(METRIC_CACHE_EVICTIONS).increment(count);
}
