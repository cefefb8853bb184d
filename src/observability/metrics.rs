//! Metrics collection and exposition.
//!
//! # Metrics
//! - `app_router_detect_total` (counter): detections by outcome, application
//! - `app_router_reverse_total` (counter): reverse rewrites by outcome
//! - `app_router_applications` (gauge): applications currently registered
//! - `app_router_request_duration_seconds` (histogram): request latency

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome of an application detection.
pub fn record_detect(outcome: &'static str, application: &str) {
    counter!(
        "app_router_detect_total",
        "outcome" => outcome,
        "application" => application.to_string()
    )
    .increment(1);
}

/// Record the outcome of a reverse route rewrite.
pub fn record_reverse(outcome: &'static str) {
    counter!("app_router_reverse_total", "outcome" => outcome).increment(1);
}

/// Record the number of registered applications.
pub fn record_applications(count: usize) {
    gauge!("app_router_applications").set(count as f64);
}

/// Record a served request.
pub fn record_request(status: u16, application: &str, start: Instant) {
    histogram!(
        "app_router_request_duration_seconds",
        "status" => status.to_string(),
        "application" => application.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}
