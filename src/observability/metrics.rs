//! Metrics collection and exposition.
//!
//! # Metrics
//! - `manifest_router_requests_total` (counter): requests by method, outcome
//! - `manifest_router_request_duration_seconds` (histogram): latency distribution
//! - `manifest_router_endpoints` (gauge): endpoints in the live index
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so tests and the
//!   `check` command never need one
//! - Outcome labels are a small fixed set (`ok`, `bad_request`, ...)

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder with its scrape listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    metrics::describe_counter!(
        "manifest_router_requests_total",
        "Total number of dispatched requests"
    );
    metrics::describe_histogram!(
        "manifest_router_request_duration_seconds",
        "Request dispatch duration in seconds"
    );
    metrics::describe_gauge!(
        "manifest_router_endpoints",
        "Number of endpoints in the dispatch index"
    );

    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, outcome: &'static str, start: Instant) {
    let method = method.to_string();
    metrics::counter!(
        "manifest_router_requests_total",
        "method" => method.clone(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!(
        "manifest_router_request_duration_seconds",
        "method" => method
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_endpoints(count: usize) {
    metrics::gauge!("manifest_router_endpoints").set(count as f64);
}
