//! Error types for Colloquy

use thiserror::Error;

/// Result type alias for Colloquy operations
pub type ColloquyResult<T> = Result<T, ColloquyError>;

/// Main error type for Colloquy
#[derive(Error, Debug, Clone)]
pub enum ColloquyError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// LLM client errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Conversation history management errors
    #[error("History error: {0}")]
    History(String),

    /// Message conversion errors
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Tool execution errors
    #[error("Tool error: {tool_name}: {message}")]
    Tool { tool_name: String, message: String },

    /// Agent execution errors
    #[error("Agent error: {0}")]
    Agent(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Task was cancelled
    #[error("Task was cancelled")]
    Cancelled,

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

impl ColloquyError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create a new history error
    pub fn history(message: impl Into<String>) -> Self {
        Self::History(message.into())
    }

    /// Create a new tool error
    pub fn tool(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Create a new agent error
    pub fn agent(message: impl Into<String>) -> Self {
        Self::Agent(message.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

impl From<anyhow::Error> for ColloquyError {
    fn from(error: anyhow::Error) -> Self {
        Self::Other(error.to_string())
    }
}

impl From<std::io::Error> for ColloquyError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for ColloquyError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error.to_string())
    }
}

impl From<crate::history::CompressionError> for ColloquyError {
    fn from(error: crate::history::CompressionError) -> Self {
        Self::History(error.to_string())
    }
}

impl From<crate::llm::ConversionError> for ColloquyError {
    fn from(error: crate::llm::ConversionError) -> Self {
        Self::Conversion(error.to_string())
    }
}

impl From<crate::tools::ToolError> for ColloquyError {
    fn from(error: crate::tools::ToolError) -> Self {
        Self::Other(error.to_string())
    }
}
