//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so a minimal (or absent) config file works.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the web gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Static site settings (webroot, index, error pages).
    pub site: SiteConfig,

    /// Upstream services the gateway proxies to.
    pub upstreams: UpstreamsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request body size limits.
    pub limits: LimitsConfig,

    /// Response compression settings.
    pub compression: CompressionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Static site configuration.
///
/// The gateway serves the web application from `webroot`. Requests that do
/// not match a file fall back to the index document so client-side routing
/// keeps working after a full page reload.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Directory containing the built web application.
    pub webroot: PathBuf,

    /// Index document served for unmatched paths (SPA fallback).
    pub index_file: String,

    /// Page served when the gateway itself produces a 404.
    pub not_found_page: String,

    /// Page served when the gateway itself produces a 5xx.
    pub server_error_page: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            webroot: PathBuf::from("webroot"),
            index_file: "index.html".to_string(),
            not_found_page: "404.html".to_string(),
            server_error_page: "50x.html".to_string(),
        }
    }
}

/// The two upstream services behind the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamsConfig {
    /// API server, reached through the `/api` prefix.
    pub api: UpstreamConfig,

    /// File server, reached through the `/files` prefix.
    pub files: UpstreamConfig,
}

impl Default for UpstreamsConfig {
    /// Matches the usual single-host deployment: API server on 8008, file
    /// server on 8081.
    fn default() -> Self {
        Self {
            api: UpstreamConfig {
                address: "127.0.0.1:8008".to_string(),
            },
            files: UpstreamConfig {
                address: "127.0.0.1:8081".to_string(),
            },
        }
    }
}

/// A single upstream address.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream authority, `host:port` (no scheme, no path).
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:8008".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout towards upstreams, in seconds.
    pub connect_secs: u64,

    /// Total request timeout (any route), in seconds.
    pub request_secs: u64,

    /// Timeout for a single proxied upstream exchange, in seconds.
    /// Exceeding it yields 504 Gateway Timeout.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 300,
            upstream_secs: 60,
        }
    }
}

/// Request body size limits, in bytes. Zero means unlimited; the default is
/// unlimited because uploads of arbitrary size go to the file server through
/// `/files`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body accepted on the `/api` prefix.
    pub api_max_body_bytes: usize,

    /// Maximum request body accepted on the `/files` prefix.
    pub files_max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            api_max_body_bytes: 0,
            files_max_body_bytes: 0,
        }
    }
}

/// Response compression settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Enable gzip compression of responses.
    pub enabled: bool,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
