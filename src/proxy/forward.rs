//! Request forwarding to upstream services.
//!
//! # Data Flow
//! ```text
//! Prefix-stripped request ("/api/foo" arrives here as "/foo")
//!     → rewrite URI onto the upstream authority
//!     → strip hop-by-hop headers, stamp forwarding headers
//!     → hyper client (pooled, connect timeout)
//!     → strip hop-by-hop headers from the response
//!     → relay status, headers and body verbatim
//! ```
//!
//! Upstream failures are the only responses the gateway authors itself on
//! these routes: 502 when the exchange fails outright, 504 when it times out.
//! Whatever status the upstream returns, including its own 404s and 500s,
//! passes through untouched.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{StatusCode, Version};
use axum::response::Response;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;

use crate::observability::metrics;
use crate::proxy::headers;
use crate::proxy::upstream::Upstream;
use crate::site::error_pages::ErrorPages;

/// Pooled HTTP client used for all upstream traffic.
pub type Client = hyper_util::client::legacy::Client<HttpConnector, Body>;

/// Shared state for one proxied prefix.
#[derive(Clone)]
pub struct ProxyState {
    /// Target service for this prefix.
    pub upstream: Arc<Upstream>,

    /// Connection-pooled client.
    pub client: Client,

    /// Gateway-authored error pages for 502/504.
    pub pages: Arc<ErrorPages>,

    /// Budget for a single upstream exchange.
    pub upstream_timeout: Duration,
}

/// Build the upstream client with the configured connect timeout.
pub fn build_client(connect_timeout: Duration) -> Client {
    let mut connector = HttpConnector::new();
    connector.set_connect_timeout(Some(connect_timeout));
    connector.set_nodelay(true);

    hyper_util::client::legacy::Client::builder(TokioExecutor::new()).build(connector)
}

/// Forward a request to this prefix's upstream.
pub async fn forward(
    State(state): State<ProxyState>,
    ConnectInfo(peer_addr): ConnectInfo<SocketAddr>,
    mut request: Request,
) -> Response {
    let uri = match state.upstream.rewrite_uri(request.uri()) {
        Ok(uri) => uri,
        Err(error) => {
            tracing::error!(
                upstream = state.upstream.name(),
                %error,
                "failed to rewrite upstream uri"
            );
            return state.pages.render(StatusCode::BAD_GATEWAY).await;
        }
    };

    tracing::debug!(upstream = state.upstream.name(), uri = %uri, "forwarding request");

    *request.uri_mut() = uri;
    // The upstream hop is always HTTP/1.1, whatever the browser spoke.
    *request.version_mut() = Version::HTTP_11;
    headers::strip_hop_by_hop(request.headers_mut());
    headers::apply_forwarding_headers(request.headers_mut(), peer_addr.ip());

    match tokio::time::timeout(state.upstream_timeout, state.client.request(request)).await {
        Ok(Ok(response)) => {
            let (mut parts, body) = response.into_parts();
            headers::strip_hop_by_hop(&mut parts.headers);
            Response::from_parts(parts, Body::new(body))
        }
        Ok(Err(error)) => {
            tracing::warn!(
                upstream = state.upstream.name(),
                %error,
                "upstream request failed"
            );
            metrics::record_upstream_error(state.upstream.name(), "transport");
            state.pages.render(StatusCode::BAD_GATEWAY).await
        }
        Err(_) => {
            tracing::warn!(
                upstream = state.upstream.name(),
                timeout_secs = state.upstream_timeout.as_secs(),
                "upstream request timed out"
            );
            metrics::record_upstream_error(state.upstream.name(), "timeout");
            state.pages.render(StatusCode::GATEWAY_TIMEOUT).await
        }
    }
}
