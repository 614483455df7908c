//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (bounded listener)
//!     → server.rs (Axum router, middleware stack)
//!     → request.rs (request ID in, echoed out)
//!     → site routes or proxied prefixes
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::HttpServer;
