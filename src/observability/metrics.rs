//! Metrics collection and exposition.
//!
//! # Metrics
//! - `storefront_http_requests_total` (counter): logical requests by service, outcome
//! - `storefront_http_request_duration_seconds` (histogram): end-to-end latency incl. retries
//! - `storefront_http_retries_total` (counter): retries by service
//! - `storefront_circuit_transitions_total` (counter): breaker transitions by service, state
//! - `storefront_navigations_total` (counter): route resolutions by outcome
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - The Prometheus exporter is opt-in via configuration

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record a finished logical request.
pub fn record_request(service: &str, outcome: &str, start: Instant) {
    counter!(
        "storefront_http_requests_total",
        "service" => service.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
    histogram!(
        "storefront_http_request_duration_seconds",
        "service" => service.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_retry(service: &str) {
    counter!("storefront_http_retries_total", "service" => service.to_string()).increment(1);
}

pub fn record_circuit_transition(service: &str, state: &'static str) {
    counter!(
        "storefront_circuit_transitions_total",
        "service" => service.to_string(),
        "state" => state
    )
    .increment(1);
}

pub fn record_navigation(outcome: &'static str) {
    counter!("storefront_navigations_total", "outcome" => outcome).increment(1);
}
