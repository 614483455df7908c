//! Custom error pages for gateway-authored responses.
//!
//! Only responses the gateway itself produces go through here: 404 for
//! unresolvable static paths and 502/504 (plus any other 5xx of our own
//! making) for upstream failures. Upstream-produced error statuses are
//! relayed untouched and never see these pages.

use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;

use crate::config::SiteConfig;

/// Maps gateway-authored statuses to files under the webroot.
#[derive(Debug)]
pub struct ErrorPages {
    webroot: PathBuf,
    not_found_page: String,
    server_error_page: String,
}

impl ErrorPages {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            webroot: config.webroot.clone(),
            not_found_page: config.not_found_page.clone(),
            server_error_page: config.server_error_page.clone(),
        }
    }

    /// The page file for a status, if one is configured.
    fn page_for(&self, status: StatusCode) -> Option<&Path> {
        match status.as_u16() {
            404 => Some(Path::new(&self.not_found_page)),
            500 | 502 | 503 | 504 => Some(Path::new(&self.server_error_page)),
            _ => None,
        }
    }

    /// Build the response for a gateway-authored status.
    ///
    /// Falls back to a plain-text response when no page is configured for
    /// the status or the page file cannot be read.
    pub async fn render(&self, status: StatusCode) -> Response {
        let Some(page) = self.page_for(status) else {
            return plain(status);
        };

        let path = self.webroot.join(page);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let mut response = Response::new(Body::from(bytes));
                *response.status_mut() = status;
                response.headers_mut().insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/html; charset=utf-8"),
                );
                response
            }
            Err(error) => {
                tracing::debug!(
                    page = %path.display(),
                    %error,
                    "error page unavailable, sending plain response"
                );
                plain(status)
            }
        }
    }
}

fn plain(status: StatusCode) -> Response {
    let reason = status.canonical_reason().unwrap_or("error");
    let mut response = Response::new(Body::from(reason));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
