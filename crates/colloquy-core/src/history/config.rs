//! History management configuration

use super::strategy::CompactionStrategy;
use serde::{Deserialize, Serialize};

/// Per-call configuration for the history pipeline
///
/// Every control is optional and independent. Compaction is strictly
/// opt-in: without an explicit strategy the pipeline never summarizes,
/// regardless of how large the conversation has grown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Compaction strategy; `None` disables compaction entirely
    pub compaction: Option<CompactionStrategy>,

    /// Token budget for the prepared message list
    pub max_tokens: Option<usize>,

    /// Message-count cap for the prepared message list
    pub max_history_size: Option<usize>,

    /// Whether per-message token estimates are memoized
    pub enable_token_caching: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            compaction: None,
            max_tokens: None,
            max_history_size: None,
            enable_token_caching: true,
        }
    }
}

impl HistoryConfig {
    /// Create a new configuration with no controls enabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the compaction strategy
    pub fn with_compaction(mut self, strategy: CompactionStrategy) -> Self {
        self.compaction = Some(strategy);
        self
    }

    /// Set the token budget
    pub fn with_max_tokens(mut self, max: usize) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Set the message-count cap
    pub fn with_max_history_size(mut self, max: usize) -> Self {
        self.max_history_size = Some(max);
        self
    }

    /// Enable or disable token-estimate caching
    pub fn with_token_caching(mut self, enabled: bool) -> Self {
        self.enable_token_caching = enabled;
        self
    }

    /// Check whether any control is configured
    pub fn is_noop(&self) -> bool {
        self.compaction.is_none() && self.max_tokens.is_none() && self.max_history_size.is_none()
    }
}
