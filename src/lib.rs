//! Web gateway for the task-pipeline platform.
//!
//! Serves the built web application, and fronts the platform's API server
//! and file server behind the `/api` and `/files` prefixes.

pub mod api;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod proxy;
pub mod site;

pub use config::{load_config, GatewayConfig};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use net::BoundedListener;
