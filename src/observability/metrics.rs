//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ga4_proxy_requests_total` (counter): requests by endpoint and status
//! - `ga4_proxy_request_duration_seconds` (histogram): latency by endpoint
//!
//! Without an installed recorder the macros are no-ops.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one finished request.
pub fn record_request(endpoint: &'static str, status: u16, start: Instant) {
    ::metrics::counter!(
        "ga4_proxy_requests_total",
        "endpoint" => endpoint,
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("ga4_proxy_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

/// Middleware recording every response of an endpoint.
pub async fn track_request(
    State(endpoint): State<&'static str>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let response = next.run(request).await;
    record_request(endpoint, response.status().as_u16(), start);
    response
}
