//! Client metrics.
//!
//! # Metrics
//! - `apollo_requests_total` (counter): responses by endpoint, status
//! - `apollo_transport_errors_total` (counter): failed sends by endpoint
//! - `apollo_cache_refresh_total` (counter): cache replacements by namespace
//! - `apollo_poll_total` (counter): long-poll outcomes
//!   (not_modified, changed, empty, error)
//!
//! Without an installed recorder these are no-ops.

pub fn record_request(endpoint: &'static str, status: u16) {
    ::metrics::counter!(
        "apollo_requests_total",
        "endpoint" => endpoint,
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_transport_error(endpoint: &'static str) {
    ::metrics::counter!("apollo_transport_errors_total", "endpoint" => endpoint).increment(1);
}

pub fn record_refresh(namespace: &str) {
    ::metrics::counter!("apollo_cache_refresh_total", "namespace" => namespace.to_string())
        .increment(1);
}

pub fn record_poll(outcome: &'static str) {
    ::metrics::counter!("apollo_poll_total", "outcome" => outcome).increment(1);
}
