//! Compaction strategies
//!
//! A strategy is a pure description of how a conversation is reduced;
//! executing one requires a [`Summarizer`](crate::history::Summarizer).
//! The set is closed: the executor matches exhaustively, so adding a
//! variant forces a handler at compile time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a conversation is compacted before a model call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CompactionStrategy {
    /// Summarize everything except the leading system message and the
    /// first user message
    WholeHistory,
    /// Keep the last `n` messages verbatim, summarize everything before
    LastN(usize),
    /// Summarize the compactable span in contiguous chunks of the given
    /// size, one summary per chunk
    Chunked(usize),
    /// Summarize messages older than the cutoff, keep the rest verbatim
    FromTimestamp(DateTime<Utc>),
    /// Split at each system-message boundary and compact each section as a
    /// whole history
    MultiSystemSections,
}

impl CompactionStrategy {
    /// Strategy name for logs and warnings
    pub fn name(&self) -> &'static str {
        match self {
            Self::WholeHistory => "whole_history",
            Self::LastN(_) => "last_n",
            Self::Chunked(_) => "chunked",
            Self::FromTimestamp(_) => "from_timestamp",
            Self::MultiSystemSections => "multi_system_sections",
        }
    }
}

impl std::fmt::Display for CompactionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WholeHistory => write!(f, "whole_history"),
            Self::LastN(n) => write!(f, "last_n({n})"),
            Self::Chunked(k) => write!(f, "chunked({k})"),
            Self::FromTimestamp(t) => write!(f, "from_timestamp({})", t.to_rfc3339()),
            Self::MultiSystemSections => write!(f, "multi_system_sections"),
        }
    }
}
