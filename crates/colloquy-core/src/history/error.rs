//! Error types for history management

use thiserror::Error;

/// Errors arising from the history pipeline
///
/// Only `InvalidTokenLimit` ever reaches callers of
/// [`HistoryManager::apply`](crate::history::HistoryManager::apply). The
/// other variants are internal signals: `CompressionFailed` is absorbed into
/// a fallback outcome and logged, `InsufficientHistory` is a logged no-op.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompressionError {
    /// The token budget cannot accommodate even the system message
    #[error(
        "token limit {max_tokens} cannot fit the system prompt ({system_prompt_tokens} tokens)"
    )]
    InvalidTokenLimit {
        system_prompt_tokens: usize,
        max_tokens: usize,
    },

    /// The summarizer call failed; the original history was substituted
    #[error("compaction with strategy {strategy} failed: {cause}")]
    CompressionFailed { strategy: String, cause: String },

    /// The compactable span is below the minimum-size guard
    #[error("history too small to compact: {count} messages, minimum {minimum}")]
    InsufficientHistory { count: usize, minimum: usize },
}
