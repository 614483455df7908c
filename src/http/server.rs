//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request ID, tracing, metrics, timeout, compression)
//! - Serve on the bounded listener with graceful shutdown
//!
//! # Routing
//! ```text
//! /version.json  → static manifest, Cache-Control: no-cache
//! /api/*         → API server (prefix stripped)
//! /files/*       → file server (prefix stripped)
//! everything else → webroot, index fallback
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Request;
use axum::http::{header, HeaderValue};
use axum::middleware;
use axum::routing::{any, get};
use axum::serve::ListenerExt;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::GatewayConfig;
use crate::http::request::{propagate_request_id, set_request_id, X_REQUEST_ID};
use crate::lifecycle::Shutdown;
use crate::net::BoundedListener;
use crate::observability::metrics;
use crate::proxy::{build_client, forward, ProxyState, Upstream, UpstreamError};
use crate::site::{serve_site, serve_version, ErrorPages, SiteState};

/// HTTP server for the web gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Assemble the server from a validated configuration.
    pub fn new(config: &GatewayConfig) -> Result<Self, UpstreamError> {
        Ok(Self {
            router: build_router(config)?,
        })
    }

    /// Run the server until shutdown is triggered, then drain.
    pub async fn run(
        self,
        listener: BoundedListener,
        shutdown: Shutdown,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        // `tap_io` with a no-op closure wraps the listener in `TapIo`, the
        // only listener adapter axum provides a `Connected` impl for, so
        // `ConnectInfo<SocketAddr>` extraction works with a custom listener.
        axum::serve(listener.tap_io(|_io| {}), app)
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The assembled router, for driving requests through in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Build the Axum router with all middleware layers.
fn build_router(config: &GatewayConfig) -> Result<Router, UpstreamError> {
    let pages = Arc::new(ErrorPages::new(&config.site));
    let client = build_client(Duration::from_secs(config.timeouts.connect_secs));
    let upstream_timeout = Duration::from_secs(config.timeouts.upstream_secs);

    let api = ProxyState {
        upstream: Arc::new(Upstream::new("api", &config.upstreams.api.address)?),
        client: client.clone(),
        pages: Arc::clone(&pages),
        upstream_timeout,
    };
    let files = ProxyState {
        upstream: Arc::new(Upstream::new("files", &config.upstreams.files.address)?),
        client,
        pages: Arc::clone(&pages),
        upstream_timeout,
    };

    tracing::info!(
        api = %api.upstream.base_url(),
        files = %files.upstream.base_url(),
        webroot = %config.site.webroot.display(),
        "gateway routes configured"
    );

    let site = SiteState::new(&config.site, pages);

    // Browsers must revalidate the version manifest after every deploy.
    let version_route = get(serve_version).layer(SetResponseHeaderLayer::overriding(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache"),
    ));

    let mut api_service = any(forward).with_state(api);
    if config.limits.api_max_body_bytes > 0 {
        api_service = api_service.layer(RequestBodyLimitLayer::new(config.limits.api_max_body_bytes));
    }

    let mut files_service = any(forward).with_state(files);
    if config.limits.files_max_body_bytes > 0 {
        files_service =
            files_service.layer(RequestBodyLimitLayer::new(config.limits.files_max_body_bytes));
    }

    let mut router = Router::new()
        .route("/version.json", version_route)
        .fallback(serve_site)
        .with_state(site)
        .nest_service("/api", api_service)
        .nest_service("/files", files_service);

    if config.compression.enabled {
        router = router.layer(CompressionLayer::new());
    }

    // ServiceBuilder applies top to bottom: the request ID must exist before
    // the trace span reads it, and metrics sit outside the timeout so a
    // timed-out request is still counted with its final status.
    let router = router.layer(
        ServiceBuilder::new()
            .layer(set_request_id())
            .layer(propagate_request_id())
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(|request: &Request| {
                        let request_id = request
                            .headers()
                            .get(X_REQUEST_ID)
                            .and_then(|value| value.to_str().ok())
                            .unwrap_or("-");
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            uri = %request.uri(),
                            request_id,
                        )
                    })
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(middleware::from_fn(metrics::track_requests))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            ))),
    );

    Ok(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;

    #[test]
    fn test_build_router_with_defaults() {
        assert!(build_router(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_build_router_rejects_bad_upstream() {
        let mut config = GatewayConfig::default();
        config.upstreams.api.address = "http://scheme-not-allowed:8008".to_string();
        assert!(matches!(
            build_router(&config),
            Err(UpstreamError::InvalidAuthority { name: "api", .. })
        ));
    }
}
