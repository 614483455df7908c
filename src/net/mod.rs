//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → Hand off to HTTP layer via axum::serve
//! ```
//!
//! # Design Decisions
//! - Bounded accept queue prevents resource exhaustion
//! - The connection permit travels with the stream, so slots free up
//!   exactly when connections close

pub mod listener;

pub use listener::{BoundedListener, ListenerError};
