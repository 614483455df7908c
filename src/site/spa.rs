//! Static delivery of the single-page web application.
//!
//! # Responsibilities
//! - Serve built assets from the webroot with correct content types
//! - Fall back to the index document for unmatched paths, so client-side
//!   routes survive a full page reload (served as 200, not a redirect)
//! - Serve `version.json` (the build's version manifest)
//! - Route unresolvable requests to the configured 404 page
//!
//! # Design Decisions
//! - Built on tower-http's `ServeDir`/`ServeFile` rather than hand-rolled
//!   file IO: path traversal protection, range requests, conditional GETs
//!   and mime guessing come with it

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::Response;
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};

use crate::config::SiteConfig;
use crate::site::error_pages::ErrorPages;

/// Name of the version manifest at the webroot.
pub const VERSION_MANIFEST: &str = "version.json";

/// Shared state for static site routes.
#[derive(Clone)]
pub struct SiteState {
    serve: ServeDir<ServeFile>,
    version: ServeFile,
    pages: Arc<ErrorPages>,
}

impl SiteState {
    pub fn new(config: &SiteConfig, pages: Arc<ErrorPages>) -> Self {
        let index = ServeFile::new(config.webroot.join(&config.index_file));
        let serve = ServeDir::new(&config.webroot)
            .append_index_html_on_directories(true)
            .fallback(index);
        let version = ServeFile::new(config.webroot.join(VERSION_MANIFEST));

        Self {
            serve,
            version,
            pages,
        }
    }
}

/// Serve the web application: assets by path, index for everything else.
pub async fn serve_site(State(state): State<SiteState>, request: Request) -> Response {
    let response = match state.serve.clone().oneshot(request).await {
        Ok(response) => response,
        Err(infallible) => match infallible {},
    };

    // ServeDir only reports 404 here when the fallback index itself is
    // missing, in which case the configured 404 page takes over.
    if response.status() == StatusCode::NOT_FOUND {
        return state.pages.render(StatusCode::NOT_FOUND).await;
    }

    response.map(Body::new)
}

/// Serve the version manifest.
///
/// The no-cache header is layered on in the router so browsers revalidate
/// after each deployment.
pub async fn serve_version(State(state): State<SiteState>, request: Request) -> Response {
    let response = match state.version.clone().oneshot(request).await {
        Ok(response) => response,
        Err(infallible) => match infallible {},
    };

    if response.status() == StatusCode::NOT_FOUND {
        return state.pages.render(StatusCode::NOT_FOUND).await;
    }

    response.map(Body::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::header;
    use std::fs;
    use std::path::PathBuf;

    fn temp_webroot() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gateway-site-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn state_for(webroot: &PathBuf) -> SiteState {
        let config = SiteConfig {
            webroot: webroot.clone(),
            ..SiteConfig::default()
        };
        SiteState::new(&config, Arc::new(ErrorPages::new(&config)))
    }

    fn get(path: &str) -> Request {
        Request::builder()
            .uri(path)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_serves_existing_asset() {
        let webroot = temp_webroot();
        fs::write(webroot.join("app.js"), "console.log('hi')").unwrap();
        let state = state_for(&webroot);

        let response = serve_site(State(state), get("/app.js")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.contains("javascript"), "{content_type}");
        assert_eq!(body_text(response).await, "console.log('hi')");
    }

    #[tokio::test]
    async fn test_unmatched_path_falls_back_to_index_with_200() {
        let webroot = temp_webroot();
        fs::write(webroot.join("index.html"), "<html>app</html>").unwrap();
        let state = state_for(&webroot);

        let response = serve_site(State(state), get("/projects/42/experiments")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "<html>app</html>");
    }

    #[tokio::test]
    async fn test_root_serves_index() {
        let webroot = temp_webroot();
        fs::write(webroot.join("index.html"), "<html>app</html>").unwrap();
        let state = state_for(&webroot);

        let response = serve_site(State(state), get("/")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "<html>app</html>");
    }

    #[tokio::test]
    async fn test_missing_index_yields_404_page() {
        let webroot = temp_webroot();
        fs::write(webroot.join("404.html"), "<h1>not found</h1>").unwrap();
        let state = state_for(&webroot);

        let response = serve_site(State(state), get("/anything")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "<h1>not found</h1>");
    }

    #[tokio::test]
    async fn test_version_manifest_served() {
        let webroot = temp_webroot();
        fs::write(webroot.join("version.json"), r#"{"version":"1.16.0"}"#).unwrap();
        let state = state_for(&webroot);

        let response = serve_version(State(state), get("/version.json")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.contains("json"), "{content_type}");
        assert_eq!(body_text(response).await, r#"{"version":"1.16.0"}"#);
    }

    #[tokio::test]
    async fn test_missing_version_manifest_is_404() {
        let webroot = temp_webroot();
        let state = state_for(&webroot);

        let response = serve_version(State(state), get("/version.json")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
