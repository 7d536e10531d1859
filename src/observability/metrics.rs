//! Metrics collection and exposition.
//!
//! # Metrics
//! - `qrmagic_requests_total` (counter): API calls by endpoint, status
//! - `qrmagic_request_duration_seconds` (histogram): latency per endpoint
//! - `qrmagic_requests_in_flight` (gauge): current throttle occupancy
//! - `qrmagic_retries_total` (counter): retried attempts by endpoint
//! - `qrmagic_scans_total` (counter): batch items by outcome

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`. Failures are logged, not fatal.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished API call. `status` is 0 when no response arrived.
pub fn record_request(endpoint: &str, status: u16, start: Instant) {
    metrics::counter!(
        "qrmagic_requests_total",
        "endpoint" => endpoint.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("qrmagic_request_duration_seconds", "endpoint" => endpoint.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record a retry of an API call.
pub fn record_retry(endpoint: &str) {
    metrics::counter!("qrmagic_retries_total", "endpoint" => endpoint.to_string()).increment(1);
}

/// Record throttle occupancy.
pub fn record_in_flight(count: usize) {
    metrics::gauge!("qrmagic_requests_in_flight").set(count as f64);
}

/// Record the outcome of one batch item ("ok" or "failed").
pub fn record_scan(outcome: &'static str) {
    metrics::counter!("qrmagic_scans_total", "outcome" => outcome).increment(1);
}
