//! Metrics collection and exposition.
//!
//! # Metrics
//! - `vault_view_calls_total` (counter): view calls by function, outcome
//! - `vault_view_call_duration_seconds` (histogram): view call latency
//! - `vault_transactions_total` (counter): submissions by function, outcome
//! - `vault_transaction_duration_seconds` (histogram): submit-to-finality latency
//! - `vault_api_requests_total` (counter): dashboard API requests by route, status
//! - `vault_node_healthy` (gauge): 1=reachable, 0=unreachable
//! - `vault_share_price` (gauge): last sampled share price

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

fn outcome(success: bool) -> &'static str {
    if success {
        "ok"
    } else {
        "error"
    }
}

pub fn record_view_call(function: &str, success: bool, start: Instant) {
    let function = function.to_string();
    metrics::counter!("vault_view_calls_total", "function" => function.clone(), "outcome" => outcome(success))
        .increment(1);
    metrics::histogram!("vault_view_call_duration_seconds", "function" => function)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_transaction(function: &str, success: bool, start: Instant) {
    let function = function.to_string();
    metrics::counter!("vault_transactions_total", "function" => function.clone(), "outcome" => outcome(success))
        .increment(1);
    metrics::histogram!("vault_transaction_duration_seconds", "function" => function)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_api_request(route: &str, status: u16) {
    metrics::counter!(
        "vault_api_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_node_health(healthy: bool) {
    metrics::gauge!("vault_node_healthy").set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_share_price(price: f64) {
    metrics::gauge!("vault_share_price").set(price);
}
