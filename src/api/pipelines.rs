//! Wire contract for the pipelines service.
//!
//! The gateway does not implement this service; the API server behind `/api`
//! does. The types here pin down the `start_pipeline` exchange so the CLI
//! and tests speak exactly the dialect the server expects.

use serde::{Deserialize, Serialize};

/// Service name on the wire.
pub const SERVICE: &str = "pipelines";

/// API version the contract is written against.
pub const API_VERSION: &str = "2.17";

/// Path of the start_pipeline endpoint, as the API server mounts it.
/// Reached through the gateway by prefixing `/api`.
pub fn start_pipeline_path() -> String {
    format!("/v{API_VERSION}/{SERVICE}.start_pipeline")
}

/// One pipeline parameter override.
///
/// `value` is nullable on the wire: a null instructs the server to pass the
/// parameter through with no value rather than omit it. It therefore always
/// serializes, as JSON null when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineArg {
    /// Parameter name, as the pipeline declares it.
    pub name: String,

    /// Parameter value, or null to pass the parameter unset.
    #[serde(default)]
    pub value: Option<String>,
}

/// Request body for `pipelines.start_pipeline`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StartPipelineRequest {
    /// ID of the pipeline task to start. Required.
    pub task: String,

    /// Execution queue; the server picks its default when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue: Option<String>,

    /// Parameter overrides, applied in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<PipelineArg>,
}

/// Response body for `pipelines.start_pipeline`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartPipelineResponse {
    /// ID of the started pipeline task.
    pub pipeline: String,

    /// Whether the pipeline was placed on a queue (as opposed to already
    /// running or deferred).
    pub enqueued: bool,
}

/// A request that cannot be sent because it violates the contract.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SchemaViolation {
    /// `task` is required and must not be empty.
    #[error("task must not be empty")]
    EmptyTask,

    /// `queue`, when given, must not be empty.
    #[error("queue, when given, must not be empty")]
    EmptyQueue,

    /// Every argument needs a name.
    #[error("argument at index {index} has an empty name")]
    UnnamedArg { index: usize },
}

impl StartPipelineRequest {
    /// Start from just the required task ID.
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            queue: None,
            args: Vec::new(),
        }
    }

    /// Route the pipeline to a specific queue.
    pub fn with_queue(mut self, queue: impl Into<String>) -> Self {
        self.queue = Some(queue.into());
        self
    }

    /// Append a parameter override. Order is preserved on the wire.
    pub fn with_arg(mut self, name: impl Into<String>, value: Option<String>) -> Self {
        self.args.push(PipelineArg {
            name: name.into(),
            value,
        });
        self
    }

    /// Check the request against the contract before sending.
    pub fn validate(&self) -> Result<(), SchemaViolation> {
        if self.task.is_empty() {
            return Err(SchemaViolation::EmptyTask);
        }
        if matches!(self.queue.as_deref(), Some("")) {
            return Err(SchemaViolation::EmptyQueue);
        }
        for (index, arg) in self.args.iter().enumerate() {
            if arg.name.is_empty() {
                return Err(SchemaViolation::UnnamedArg { index });
            }
        }
        Ok(())
    }
}
