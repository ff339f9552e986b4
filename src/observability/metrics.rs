//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_proxy_requests_total` (counter): forwarded requests by method, status
//! - `gateway_proxy_request_duration_seconds` (histogram): backend round trip
//! - `gateway_auth_decisions_total` (counter): gate outcomes
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; exposition is optional
//! - Labels stay low-cardinality (no paths, no targets)

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`. Failures are logged; the
/// gateway keeps serving without metrics.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one forwarded request.
pub fn record_proxy_request(method: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    metrics::counter!(
        "gateway_proxy_requests_total",
        "method" => method.clone(),
        "status" => status.clone()
    )
    .increment(1);
    metrics::histogram!(
        "gateway_proxy_request_duration_seconds",
        "method" => method,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a session gate outcome.
pub fn record_auth_decision(outcome: &'static str) {
    metrics::counter!("gateway_auth_decisions_total", "outcome" => outcome).increment(1);
}
