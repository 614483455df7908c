//! Shared utilities for integration testing.
//!
//! Mock upstreams capture every request they receive so tests can assert on
//! exactly what the gateway forwarded: method, URI, headers and body.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::Request;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use axum::Router;

use web_gateway::{BoundedListener, GatewayConfig, HttpServer, Shutdown};

/// One request as an upstream received it.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// A capturing mock for the API server or file server.
pub struct MockUpstream {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockUpstream {
    /// Upstream answering every request with a fixed JSON response.
    pub async fn fixed(status: StatusCode, body: serde_json::Value) -> Self {
        Self::with_handler(move |_| {
            let body = body.clone();
            async move { json_response(status, &body) }
        })
        .await
    }

    /// Upstream with a programmable async handler.
    pub async fn with_handler<F, Fut>(handler: F) -> Self
    where
        F: Fn(CapturedRequest) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests: Arc<Mutex<Vec<CapturedRequest>>> = Arc::new(Mutex::new(Vec::new()));

        let captured = Arc::clone(&requests);
        let app = Router::new().fallback(move |request: Request| {
            let captured = Arc::clone(&captured);
            let handler = handler.clone();
            async move {
                let (parts, body) = request.into_parts();
                let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
                let record = CapturedRequest {
                    method: parts.method.to_string(),
                    uri: parts.uri.to_string(),
                    headers: parts.headers.clone(),
                    body: bytes.to_vec(),
                };
                captured.lock().unwrap().push(record.clone());
                handler(record).await
            }
        });

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, requests }
    }

    /// `host:port` string for the gateway config.
    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    pub fn captured(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> CapturedRequest {
        self.captured().last().cloned().expect("upstream saw no requests")
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

/// Build a JSON response for mock handlers.
pub fn json_response(status: StatusCode, body: &serde_json::Value) -> Response {
    let mut response = Response::new(Body::from(body.to_string()));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

/// An address nothing listens on, for connection-refused scenarios.
pub async fn unreachable_address() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr.to_string()
}

/// A fresh webroot directory under the system temp dir.
pub fn temp_webroot() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("gateway-it-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn write_file(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

/// Gateway config pointing at a temp webroot and the given upstreams,
/// listening on an ephemeral port.
pub fn gateway_config(webroot: &Path, api_addr: &str, files_addr: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.site.webroot = webroot.to_path_buf();
    config.upstreams.api.address = api_addr.to_string();
    config.upstreams.files.address = files_addr.to_string();
    config
}

/// Start a gateway and return its address plus the shutdown handle.
///
/// Tests hold the `Shutdown`; the server task ends with the test runtime.
pub async fn spawn_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let listener = BoundedListener::bind(&config.listener).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config).unwrap();
    tokio::spawn(server.run(listener, shutdown.clone()));

    (addr, shutdown)
}
