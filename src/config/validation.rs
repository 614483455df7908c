//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, connection limit > 0)
//! - Check addresses parse (bind/metrics as socket addresses, upstreams as
//!   `host:port` authorities)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs after env overrides, before the config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;

/// A single validation failure, naming the offending field.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// `listener.bind_address` does not parse as `ip:port`.
    #[error("listener.bind_address {0:?} is not a valid socket address")]
    BindAddress(String),

    /// `listener.max_connections` is zero, which would refuse all traffic.
    #[error("listener.max_connections must be greater than zero")]
    NoConnections,

    /// An upstream address is empty or carries a scheme or path.
    #[error("upstreams.{upstream}.address {address:?} is not a host:port authority")]
    UpstreamAddress {
        upstream: &'static str,
        address: String,
    },

    /// A timeout is zero.
    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    /// Unknown log level.
    #[error("observability.log_level {0:?} is not one of trace, debug, info, warn, error")]
    LogLevel(String),

    /// Metrics are enabled but the exporter address does not parse.
    #[error("observability.metrics_address {0:?} is not a valid socket address")]
    MetricsAddress(String),

    /// A required site path or file name is empty.
    #[error("site.{0} must not be empty")]
    EmptySiteField(&'static str),
}

/// Validate a loaded configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.listener.max_connections == 0 {
        errors.push(ValidationError::NoConnections);
    }

    for (upstream, address) in [
        ("api", &config.upstreams.api.address),
        ("files", &config.upstreams.files.address),
    ] {
        if !is_authority(address) {
            errors.push(ValidationError::UpstreamAddress {
                upstream,
                address: address.clone(),
            });
        }
    }

    for (field, value) in [
        ("connect_secs", config.timeouts.connect_secs),
        ("request_secs", config.timeouts.request_secs),
        ("upstream_secs", config.timeouts.upstream_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout(field));
        }
    }

    let level = config.observability.log_level.to_lowercase();
    if !matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
        errors.push(ValidationError::LogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.site.webroot.as_os_str().is_empty() {
        errors.push(ValidationError::EmptySiteField("webroot"));
    }
    if config.site.index_file.is_empty() {
        errors.push(ValidationError::EmptySiteField("index_file"));
    }
    if config.site.not_found_page.is_empty() {
        errors.push(ValidationError::EmptySiteField("not_found_page"));
    }
    if config.site.server_error_page.is_empty() {
        errors.push(ValidationError::EmptySiteField("server_error_page"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// A bare `host:port` authority, as accepted for upstream addresses.
/// Schemes and paths are rejected; the gateway always speaks plain HTTP
/// to its upstreams.
fn is_authority(address: &str) -> bool {
    if address.is_empty() || address.contains('/') {
        return false;
    }
    match url::Url::parse(&format!("http://{address}")) {
        Ok(url) => url.host_str().is_some(),
        Err(_) => false,
    }
}
