//! History manager
//!
//! Orchestrates the three independent reduction controls in a fixed
//! precedence order: compaction, then token budget, then message-count
//! cap. Each step operates on the output of the previous one. The manager
//! holds no mutable state; the only I/O in a call is the single summarize
//! delegation inside the compaction step.

use super::compactor::HistoryCompactor;
use super::config::HistoryConfig;
use super::error::CompressionError;
use super::estimator::TokenEstimator;
use super::summarizer::Summarizer;
use crate::llm::{Message, MessageRole};
use std::sync::Arc;

/// Applies per-call history controls to a conversation
#[derive(Clone)]
pub struct HistoryManager {
    /// Token estimator, shared across calls when caching is enabled
    estimator: TokenEstimator,
    /// Summarization capability used by the compaction step
    summarizer: Arc<dyn Summarizer>,
}

impl HistoryManager {
    /// Create a manager over the given summarizer
    pub fn new(summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            estimator: TokenEstimator::new(),
            summarizer,
        }
    }

    /// Use a custom token estimator
    pub fn with_estimator(mut self, estimator: TokenEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    /// Get the token estimator
    pub fn estimator(&self) -> &TokenEstimator {
        &self.estimator
    }

    /// Apply the configured controls and return the reduced message list
    ///
    /// Controls run in fixed precedence: compaction (opt-in), token
    /// budget, message-count cap. The returned list never violates the
    /// requested budgets, short of the single-message floor: trimming
    /// always leaves the system message and the most recent message in
    /// place. A compaction fallback is not an error; the pipeline simply
    /// continues with the unmodified list.
    pub async fn apply(
        &self,
        messages: Vec<Message>,
        config: &HistoryConfig,
    ) -> Result<Vec<Message>, CompressionError> {
        let estimator = if config.enable_token_caching {
            self.estimator.clone()
        } else {
            self.estimator.without_cache()
        };

        // Token-limit validation gates the whole call, before any step runs.
        if let Some(max_tokens) = config.max_tokens {
            if let Some(first) = messages.first() {
                if first.role == MessageRole::System {
                    let system_prompt_tokens = estimator.estimate_message(first);
                    if system_prompt_tokens > max_tokens {
                        return Err(CompressionError::InvalidTokenLimit {
                            system_prompt_tokens,
                            max_tokens,
                        });
                    }
                }
            }
        }

        let mut current = messages;

        if let Some(strategy) = &config.compaction {
            let outcome = HistoryCompactor::new(self.summarizer.as_ref())
                .compress(strategy, &current)
                .await;
            if outcome.messages_dropped > 0 {
                tracing::debug!(
                    "Compaction with {} dropped {} message(s)",
                    strategy,
                    outcome.messages_dropped
                );
            }
            current = outcome.messages;
        }

        if let Some(max_tokens) = config.max_tokens {
            current = enforce_token_budget(&estimator, current, max_tokens);
        }

        if let Some(max_size) = config.max_history_size {
            current = enforce_history_size(current, max_size);
        }

        if current.len() < 2 {
            if let Some(strategy) = &config.compaction {
                tracing::warn!(
                    "History reduced to {} message(s) after {} compaction",
                    current.len(),
                    strategy.name()
                );
            }
        }

        Ok(current)
    }
}

/// Drop messages from the start of the non-system portion until the
/// estimate fits, or only the system message and the latest message remain
fn enforce_token_budget(
    estimator: &TokenEstimator,
    mut messages: Vec<Message>,
    max_tokens: usize,
) -> Vec<Message> {
    let has_system = messages
        .first()
        .is_some_and(|m| m.role == MessageRole::System);
    let head = usize::from(has_system);

    let mut dropped = 0;
    while messages.len() > head + 1 && estimator.estimate_conversation(&messages) > max_tokens {
        messages.remove(head);
        dropped += 1;
    }

    if dropped > 0 {
        tracing::debug!(
            "Token budget {} dropped {} message(s) from the front",
            max_tokens,
            dropped
        );
    }
    messages
}

/// Keep the system message plus the most recent messages within the cap
fn enforce_history_size(messages: Vec<Message>, max_size: usize) -> Vec<Message> {
    let has_system = messages
        .first()
        .is_some_and(|m| m.role == MessageRole::System);

    if messages.len() <= max_size {
        return messages;
    }

    let keep = max_size.saturating_sub(usize::from(has_system));
    let mut result = Vec::with_capacity(max_size);
    let mut iter = messages.into_iter();
    if has_system {
        // First element exists; checked above.
        if let Some(system) = iter.next() {
            result.push(system);
        }
    }
    let rest: Vec<Message> = iter.collect();
    let split = rest.len().saturating_sub(keep);
    result.extend(rest.into_iter().skip(split));
    result
}
