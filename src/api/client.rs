//! HTTP client for the gateway's API surface.
//!
//! Talks to a running gateway the way the web application does: requests go
//! to the gateway's address with the `/api` prefix, and the gateway relays
//! them to the API server. Used by the CLI and by integration tests.

use url::Url;

use crate::api::pipelines::{
    start_pipeline_path, SchemaViolation, StartPipelineRequest, StartPipelineResponse,
};

/// Error type for API client operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request violates the wire contract; nothing was sent.
    #[error("invalid request: {0}")]
    Schema(#[from] SchemaViolation),

    /// Building the endpoint URL from the base address failed.
    #[error("invalid endpoint url {0:?}")]
    Url(String),

    /// The exchange failed below the HTTP layer (connect, timeout, decode).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("api returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Client for a gateway instance.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Client for the gateway at `base_url` (scheme, host and port only).
    pub fn new(base_url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Use a preconfigured reqwest client (custom timeouts, proxies).
    pub fn with_http_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Start a pipeline through the gateway's `/api` prefix.
    ///
    /// The request is validated locally first; contract violations are
    /// reported without touching the network.
    pub async fn start_pipeline(
        &self,
        request: &StartPipelineRequest,
    ) -> Result<StartPipelineResponse, ApiError> {
        request.validate()?;

        let url = endpoint_url(&self.base_url, &format!("/api{}", start_pipeline_path()))?;
        let response = self.http.post(url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        Ok(response.json().await?)
    }

    /// Fetch the deployed build's version manifest.
    pub async fn site_version(&self) -> Result<serde_json::Value, ApiError> {
        let url = endpoint_url(&self.base_url, "/version.json")?;
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        Ok(response.json().await?)
    }
}

fn endpoint_url(base: &Url, path: &str) -> Result<Url, ApiError> {
    let full = format!("{}{}", base.as_str().trim_end_matches('/'), path);
    Url::parse(&full).map_err(|_| ApiError::Url(full))
}
