//! Upstream service addressing.
//!
//! An [`Upstream`] is one of the services the gateway fronts: the API server
//! or the file server. Addresses are bare `host:port` authorities; the
//! gateway always speaks plain HTTP on the upstream hop.

use axum::http::uri::{Authority, Scheme};
use axum::http::Uri;
use url::Url;

/// Error type for upstream construction.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The configured address is not a usable `host:port` authority.
    #[error("upstream {name} address {address:?} is not a valid authority")]
    InvalidAuthority { name: &'static str, address: String },
}

/// A proxy target, validated at startup.
#[derive(Debug, Clone)]
pub struct Upstream {
    name: &'static str,
    authority: Authority,
    base: Url,
}

impl Upstream {
    /// Build an upstream from a configured `host:port` address.
    pub fn new(name: &'static str, address: &str) -> Result<Self, UpstreamError> {
        let authority: Authority =
            address
                .parse()
                .map_err(|_| UpstreamError::InvalidAuthority {
                    name,
                    address: address.to_string(),
                })?;

        let base = Url::parse(&format!("http://{address}")).map_err(|_| {
            UpstreamError::InvalidAuthority {
                name,
                address: address.to_string(),
            }
        })?;

        Ok(Self {
            name,
            authority,
            base,
        })
    }

    /// Short name used in logs and metrics ("api", "files").
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Base URL of the upstream, for startup logging.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Rewrite a prefix-stripped request URI to target this upstream.
    ///
    /// The incoming URI is origin-form (path and query only); the rewrite
    /// grafts on the upstream's scheme and authority, leaving path and query
    /// untouched.
    pub fn rewrite_uri(&self, uri: &Uri) -> Result<Uri, axum::http::Error> {
        let path_and_query = uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .filter(|pq| !pq.is_empty())
            .unwrap_or("/");

        Uri::builder()
            .scheme(Scheme::HTTP)
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_preserves_path_and_query() {
        let upstream = Upstream::new("api", "127.0.0.1:8008").unwrap();
        let uri: Uri = "/v2.17/tasks.get_all?status=queued".parse().unwrap();

        let rewritten = upstream.rewrite_uri(&uri).unwrap();
        assert_eq!(
            rewritten.to_string(),
            "http://127.0.0.1:8008/v2.17/tasks.get_all?status=queued"
        );
    }

    #[test]
    fn test_rewrite_defaults_missing_path_to_root() {
        let upstream = Upstream::new("files", "fileserver:8081").unwrap();
        let uri = Uri::from_static("http://ignored.example");

        let rewritten = upstream.rewrite_uri(&uri).unwrap();
        assert_eq!(rewritten.to_string(), "http://fileserver:8081/");
    }

    #[test]
    fn test_invalid_authority_rejected() {
        let result = Upstream::new("api", "http://has-a-scheme:8008");
        assert!(matches!(
            result,
            Err(UpstreamError::InvalidAuthority { name: "api", .. })
        ));
    }

    #[test]
    fn test_base_url_exposes_scheme_and_port() {
        let upstream = Upstream::new("api", "apiserver.internal:8008").unwrap();
        assert_eq!(upstream.base_url().as_str(), "http://apiserver.internal:8008/");
        assert_eq!(upstream.name(), "api");
    }
}
