//! Metrics collection and exposition.
//!
//! # Metrics
//! - `config_polls_total` (counter): polls by outcome (success, failure, discarded)
//! - `config_poll_duration_seconds` (histogram): fetch latency
//! - `config_properties` (gauge): size of the published value set
//! - `config_http_requests_total` (counter): demo/admin requests by route, status

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

/// Record a completed poll.
pub fn record_poll(outcome: &'static str, started: Instant) {
    counter!("config_polls_total", "outcome" => outcome).increment(1);
    histogram!("config_poll_duration_seconds").record(started.elapsed().as_secs_f64());
}

/// Record the size of the published value set.
pub fn record_properties(count: usize) {
    gauge!("config_properties").set(count as f64);
}

/// Record a served HTTP request.
pub fn record_request(route: &'static str, status: u16) {
    counter!(
        "config_http_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
}
