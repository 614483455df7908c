//! Task-pipeline API surface.
//!
//! The pipelines service itself lives in the API server behind the gateway;
//! this module carries its wire contract and a client for it.

pub mod client;
pub mod pipelines;

pub use client::{ApiClient, ApiError};
pub use pipelines::{
    PipelineArg, SchemaViolation, StartPipelineRequest, StartPipelineResponse,
};
