//! Token estimation for conversation messages
//!
//! Exact tokenization varies by provider, so estimates use a
//! characters-per-token approximation with provider-specific adjustments.
//! The counting algorithm is a configuration point; whichever is plugged in
//! is expected to land within roughly 10% of the provider's reported usage.

use crate::llm::Message;
use crate::tools::ToolCall;
use dashmap::DashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Token estimator for conversation messages
///
/// With caching enabled, per-message estimates are memoized in a map that
/// may be shared across conversations on the same agent. Messages are value
/// types, so entries never go stale; population uses the map's atomic entry
/// API, making concurrent reads and inserts safe without caller-side locks.
#[derive(Debug, Clone)]
pub struct TokenEstimator {
    /// Characters per token (average)
    chars_per_token: f32,
    /// Overhead tokens per message (role, formatting)
    message_overhead: usize,
    /// Memoized per-message estimates, keyed by message value hash
    cache: Option<Arc<DashMap<u64, usize>>>,
}

impl Default for TokenEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenEstimator {
    /// Create a new caching estimator with default settings
    pub fn new() -> Self {
        Self {
            chars_per_token: 4.0, // Common approximation for English text
            message_overhead: 4,  // Role token + formatting
            cache: Some(Arc::new(DashMap::new())),
        }
    }

    /// Create an estimator optimized for a specific provider
    pub fn for_provider(provider: &str) -> Self {
        match provider.to_lowercase().as_str() {
            "anthropic" => Self {
                chars_per_token: 3.5, // Claude tends to have slightly smaller tokens
                message_overhead: 3,
                cache: Some(Arc::new(DashMap::new())),
            },
            _ => Self::new(),
        }
    }

    /// An on-demand view of this estimator that recomputes every call
    pub fn without_cache(&self) -> Self {
        Self {
            chars_per_token: self.chars_per_token,
            message_overhead: self.message_overhead,
            cache: None,
        }
    }

    /// Estimate tokens for a single message
    pub fn estimate_message(&self, message: &Message) -> usize {
        match &self.cache {
            Some(cache) => {
                let key = message_key(message);
                *cache
                    .entry(key)
                    .or_insert_with(|| self.compute_message(message))
                    .value()
            }
            None => self.compute_message(message),
        }
    }

    /// Estimate tokens for a conversation (list of messages)
    ///
    /// Returns 0 for an empty list.
    pub fn estimate_conversation(&self, messages: &[Message]) -> usize {
        messages.iter().map(|m| self.estimate_message(m)).sum()
    }

    /// Estimate tokens for a string
    pub fn estimate_string(&self, text: &str) -> usize {
        (text.len() as f32 / self.chars_per_token).ceil() as usize
    }

    fn compute_message(&self, message: &Message) -> usize {
        let content_tokens = self.estimate_string(&message.content);

        let tool_tokens: usize = message
            .tool_calls
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .map(|tc| self.estimate_tool_call(tc))
            .sum();

        content_tokens + tool_tokens + self.message_overhead
    }

    fn estimate_tool_call(&self, tool_call: &ToolCall) -> usize {
        let name_tokens = self.estimate_string(&tool_call.name);
        let args_str = serde_json::to_string(&tool_call.arguments).unwrap_or_default();
        let args_tokens = self.estimate_string(&args_str);
        name_tokens + args_tokens + 10 // Overhead for tool call structure
    }
}

/// Cache key covering exactly the fields the estimate depends on
fn message_key(message: &Message) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    message.role.hash(&mut hasher);
    message.content.hash(&mut hasher);
    message.tool_call_id.hash(&mut hasher);
    message.name.hash(&mut hasher);
    if let Some(calls) = &message.tool_calls {
        for call in calls {
            call.id.hash(&mut hasher);
            call.name.hash(&mut hasher);
            serde_json::to_string(&call.arguments)
                .unwrap_or_default()
                .hash(&mut hasher);
        }
    }
    hasher.finish()
}
