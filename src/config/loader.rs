//! Configuration loading.
//!
//! Configuration comes from three layers, later layers winning:
//! built-in defaults, an optional TOML file, and environment variables.
//! The environment is consulted exactly once, at load time; changing a
//! variable after startup has no effect on a running gateway.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding the API upstream address.
pub const APISERVER_ADDR_ENV: &str = "NGINX_APISERVER_ADDR";

/// Environment variable overriding the file-server upstream address.
pub const FILESERVER_ADDR_ENV: &str = "NGINX_FILESERVER_ADDR";

/// Environment variable overriding the webroot directory.
pub const WEBROOT_ENV: &str = "NGINX_WEBROOT";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for the expected schema.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The parsed configuration failed validation.
    #[error("invalid configuration: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Load the gateway configuration.
///
/// With `path` set, the file is read and parsed; without it the built-in
/// defaults are used. Environment overrides are applied on top in either
/// case, then the result is validated.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment variable overrides to a loaded configuration.
pub fn apply_env_overrides(config: &mut GatewayConfig) {
    apply_overrides_from(config, |name| std::env::var(name).ok());
}

/// Override resolution against an arbitrary lookup function.
///
/// Split out from [`apply_env_overrides`] so tests can exercise the
/// override logic without mutating process-global environment state.
fn apply_overrides_from<F>(config: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(addr) = lookup(APISERVER_ADDR_ENV) {
        config.upstreams.api.address = addr;
    }
    if let Some(addr) = lookup(FILESERVER_ADDR_ENV) {
        config.upstreams.files.address = addr;
    }
    if let Some(webroot) = lookup(WEBROOT_ENV) {
        config.site.webroot = webroot.into();
    }
}
