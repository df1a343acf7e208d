//! Colloquy SDK
//!
//! This crate provides a high-level client for using Colloquy agents
//! programmatically: configure once with a builder, then run tasks with
//! per-call options.
//!
//! # Example
//!
//! ```rust,ignore
//! use colloquy_sdk::{ColloquyClient, RunOptions};
//! use colloquy_core::history::{CompactionStrategy, HistoryConfig};
//!
//! let client = ColloquyClient::new(llm)
//!     .with_system_prompt("You are a concise assistant.")
//!     .with_history_config(
//!         HistoryConfig::new().with_compaction(CompactionStrategy::LastN(10)),
//!     );
//!
//! let result = client.run("Summarize the release notes").await?;
//! println!("{}", result.final_output);
//! ```

pub mod client;

pub use client::{ColloquyClient, ExecutionResult, RunOptions};

// Re-export commonly used types from core
pub use colloquy_core::{
    error::{ColloquyError, ColloquyResult},
    history::{CompactionStrategy, HistoryConfig},
    llm::{LlmClient, LlmResponse, Message, MessageRole, ModelParameters, TokenUsage},
    tools::{Tool, ToolCall, ToolResult, ToolSchema},
};
