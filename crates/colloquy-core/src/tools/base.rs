//! Base trait for tools

use crate::tools::types::{ToolCall, ToolResult, ToolSchema};
use async_trait::async_trait;

/// Error type for tool operations
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Invalid arguments provided to the tool
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Tool execution failed
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// Tool not found
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A tool the agent can expose to the model
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name as presented to the model
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// Schema sent to the model with each request
    fn schema(&self) -> ToolSchema;

    /// Execute a call to this tool
    async fn execute(&self, call: &ToolCall) -> Result<ToolResult, ToolError>;
}
