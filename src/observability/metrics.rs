//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by route class, method, status
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_upstream_errors_total` (counter): 502/504 causes by upstream
//! - `gateway_active_connections` (gauge): currently open client connections
//!
//! # Design Decisions
//! - Route labels use a coarse class (site/version/api/files), never the raw
//!   path, to bound label cardinality
//! - Recording is unconditional; without an installed exporter the macros
//!   are no-ops, so disabled metrics cost nothing

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};

pub const REQUESTS_TOTAL: &str = "gateway_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "gateway_request_duration_seconds";
pub const UPSTREAM_ERRORS_TOTAL: &str = "gateway_upstream_errors_total";
pub const ACTIVE_CONNECTIONS: &str = "gateway_active_connections";

/// Error type for metrics exporter installation.
#[derive(Debug, thiserror::Error)]
#[error("failed to install metrics exporter: {0}")]
pub struct MetricsError(#[from] metrics_exporter_prometheus::BuildError);

/// Install the Prometheus exporter, serving scrapes on `address`.
pub fn init_metrics(address: SocketAddr) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(address)
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_DURATION_SECONDS.to_string()),
            &[
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        )?
        .install()?;

    tracing::info!(address = %address, "metrics exporter listening");
    Ok(())
}

/// Middleware recording count and latency for every request.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let route = route_class(request.uri().path());
    let method = request.method().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    record_request(route, &method, response.status(), start.elapsed());
    response
}

/// Coarse route class used as the metrics label.
pub fn route_class(path: &str) -> &'static str {
    if path == "/version.json" {
        "version"
    } else if path == "/api" || path.starts_with("/api/") {
        "api"
    } else if path == "/files" || path.starts_with("/files/") {
        "files"
    } else {
        "site"
    }
}

pub fn record_request(route: &'static str, method: &Method, status: StatusCode, elapsed: Duration) {
    let method = method.as_str().to_string();
    let status = status.as_u16().to_string();

    metrics::counter!(
        REQUESTS_TOTAL,
        "route" => route,
        "method" => method.clone(),
        "status" => status.clone()
    )
    .increment(1);

    metrics::histogram!(
        REQUEST_DURATION_SECONDS,
        "route" => route,
        "method" => method,
        "status" => status
    )
    .record(elapsed.as_secs_f64());
}

pub fn record_upstream_error(upstream: &'static str, kind: &'static str) {
    metrics::counter!(UPSTREAM_ERRORS_TOTAL, "upstream" => upstream, "kind" => kind).increment(1);
}

pub fn connection_opened() {
    metrics::gauge!(ACTIVE_CONNECTIONS).increment(1.0);
}

pub fn connection_closed() {
    metrics::gauge!(ACTIVE_CONNECTIONS).decrement(1.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_class_boundaries() {
        assert_eq!(route_class("/version.json"), "version");
        assert_eq!(route_class("/api"), "api");
        assert_eq!(route_class("/api/v2.17/pipelines.start_pipeline"), "api");
        assert_eq!(route_class("/files/artifacts/model.bin"), "files");
        assert_eq!(route_class("/"), "site");
        assert_eq!(route_class("/projects/42"), "site");
        // Prefix match requires the separator; these are site paths.
        assert_eq!(route_class("/apis"), "site");
        assert_eq!(route_class("/filesystem"), "site");
    }
}
