//! Metrics collection and exposition.
//!
//! # Metrics
//! - `patmux_dispatch_total` (counter): requests by outcome and method
//! - `patmux_resolve_duration_seconds` (histogram): time spent resolving
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Labels are bounded: four outcomes times the registered methods

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::Method;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one resolved request.
pub fn record_dispatch(outcome: &'static str, method: &Method, started: Instant) {
    metrics::counter!(
        "patmux_dispatch_total",
        "outcome" => outcome,
        "method" => method.as_str().to_string()
    )
    .increment(1);
    metrics::histogram!("patmux_resolve_duration_seconds", "outcome" => outcome)
        .record(started.elapsed().as_secs_f64());
}
