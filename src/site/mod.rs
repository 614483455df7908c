//! Static site subsystem.
//!
//! # Data Flow
//! ```text
//! /version.json → spa.rs (ServeFile) + no-cache header
//! everything else → spa.rs (ServeDir, index fallback)
//!     → 404? → error_pages.rs (configured 404 page)
//! ```

pub mod error_pages;
pub mod spa;

pub use error_pages::ErrorPages;
pub use spa::{serve_site, serve_version, SiteState};
