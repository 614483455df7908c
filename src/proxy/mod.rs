//! Reverse proxying subsystem.
//!
//! # Data Flow
//! ```text
//! /api/*  → prefix stripped → forward.rs → API server
//! /files/* → prefix stripped → forward.rs → file server
//! ```
//!
//! # Design Decisions
//! - Upstream addresses are validated once at startup into [`Upstream`]
//! - One shared connection-pooled client serves both prefixes
//! - Upstream responses pass through verbatim; only transport failures and
//!   timeouts produce gateway-authored responses

pub mod forward;
pub mod headers;
pub mod upstream;

pub use forward::{build_client, forward, Client, ProxyState};
pub use upstream::{Upstream, UpstreamError};
