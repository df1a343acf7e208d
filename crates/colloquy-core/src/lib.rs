//! Colloquy Core Library
//!
//! This crate provides the core functionality for the Colloquy SDK:
//! conversation history management, the message model and provider bridge,
//! typed tool abstractions, and the agent step loop.

pub mod agent;
pub mod error;
pub mod history;
pub mod llm;
pub mod tools;

// Re-export commonly used types
pub use agent::{Agent, AgentOptions};
pub use error::{ColloquyError, ColloquyResult};
pub use history::{
    CompactionOutcome, CompactionStrategy, CompressionError, HistoryConfig, HistoryManager,
    Summarizer, TokenEstimator,
};
pub use llm::{LlmClient, LlmResponse, Message, MessageBridge, MessageRole, ModelParameters};
pub use tools::{Tool, ToolCall, ToolResult, ToolSchema};
