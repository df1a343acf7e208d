//! LLM message model, provider bridge, and client seam

pub mod bridge;
pub mod client;
pub mod messages;

pub use bridge::{ConversionError, MessageBridge, ProviderMessage, ProviderRole};
pub use client::{LlmClient, ModelParameters};
pub use messages::{
    COMPACTION_ID_KEY, LlmResponse, Message, MessageRole, SUMMARIZED_COUNT_KEY, SUMMARY_KEY,
    TokenUsage,
};
