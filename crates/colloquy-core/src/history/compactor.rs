//! Compaction strategy execution
//!
//! The compactor turns a [`CompactionStrategy`] description into an actual
//! reduction of the message list, delegating TL;DR generation to the
//! injected [`Summarizer`]. Two rules hold for every strategy: system
//! messages are never removed or summarized, and a summarizer failure never
//! propagates; the original history is substituted and a warning emitted.

use super::error::CompressionError;
use super::strategy::CompactionStrategy;
use super::summarizer::Summarizer;
use crate::error::ColloquyResult;
use crate::llm::{Message, MessageRole};
use chrono::{DateTime, Utc};

/// Spans smaller than this are not worth a summarization call
pub const MIN_COMPACTABLE_MESSAGES: usize = 10;

/// Result of a compaction attempt
#[derive(Debug, Clone)]
pub struct CompactionOutcome {
    /// The resulting message list
    pub messages: Vec<Message>,
    /// Net number of messages removed from the list
    pub messages_dropped: usize,
    /// Whether summarization failed and the original list was substituted
    pub used_fallback: bool,
}

impl CompactionOutcome {
    fn unchanged(messages: Vec<Message>) -> Self {
        Self {
            messages,
            messages_dropped: 0,
            used_fallback: false,
        }
    }

    fn fallback(messages: Vec<Message>) -> Self {
        Self {
            messages,
            messages_dropped: 0,
            used_fallback: true,
        }
    }
}

/// Executes compaction strategies against a message list
pub struct HistoryCompactor<'a> {
    summarizer: &'a dyn Summarizer,
}

impl<'a> HistoryCompactor<'a> {
    /// Create a compactor over the given summarizer
    pub fn new(summarizer: &'a dyn Summarizer) -> Self {
        Self { summarizer }
    }

    /// Compress a message list according to the strategy
    ///
    /// Skips entirely when the compactable span (the list minus the
    /// preserved head) is below [`MIN_COMPACTABLE_MESSAGES`]; substitutes
    /// the original list when the summarizer fails. Neither case is an
    /// error to the caller.
    pub async fn compress(
        &self,
        strategy: &CompactionStrategy,
        messages: &[Message],
    ) -> CompactionOutcome {
        if let CompactionStrategy::Chunked(0) = strategy {
            tracing::warn!("Chunked compaction with chunk size 0 requested; skipping");
            return CompactionOutcome::unchanged(messages.to_vec());
        }

        let span_len = compactable_span_len(strategy, messages);
        if span_len < MIN_COMPACTABLE_MESSAGES {
            tracing::debug!(
                "Skipping compaction: {}",
                CompressionError::InsufficientHistory {
                    count: span_len,
                    minimum: MIN_COMPACTABLE_MESSAGES,
                }
            );
            return CompactionOutcome::unchanged(messages.to_vec());
        }

        let result = match strategy {
            CompactionStrategy::WholeHistory => self.whole_history(messages).await,
            CompactionStrategy::LastN(n) => self.last_n(*n, messages).await,
            CompactionStrategy::Chunked(k) => self.chunked(*k, messages).await,
            CompactionStrategy::FromTimestamp(t) => self.from_timestamp(*t, messages).await,
            CompactionStrategy::MultiSystemSections => self.multi_system_sections(messages).await,
        };

        match result {
            Ok(compacted) => CompactionOutcome {
                messages_dropped: messages.len().saturating_sub(compacted.len()),
                messages: compacted,
                used_fallback: false,
            },
            Err(err) => {
                tracing::warn!(
                    "{}; keeping original history",
                    CompressionError::CompressionFailed {
                        strategy: strategy.to_string(),
                        cause: err.to_string(),
                    }
                );
                CompactionOutcome::fallback(messages.to_vec())
            }
        }
    }

    /// Summarize everything except the leading system message and the
    /// first user message
    async fn whole_history(&self, messages: &[Message]) -> ColloquyResult<Vec<Message>> {
        let (system, rest) = split_leading_system(messages);
        let first_user_idx = rest.iter().position(|m| m.role == MessageRole::User);

        let span: Vec<Message> = rest
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != first_user_idx)
            .map(|(_, m)| (*m).clone())
            .collect();
        if span.is_empty() {
            return Ok(messages.to_vec());
        }

        let summary = self.summarizer.summarize(&span).await?;

        let mut result = Vec::with_capacity(3);
        result.extend(system.cloned());
        if let Some(idx) = first_user_idx {
            result.push(rest[idx].clone());
        }
        result.push(summary);
        Ok(result)
    }

    /// Keep the last `n` messages verbatim, summarize everything before
    async fn last_n(&self, n: usize, messages: &[Message]) -> ColloquyResult<Vec<Message>> {
        let (system, rest) = split_leading_system(messages);
        let split = rest.len().saturating_sub(n);
        if split == 0 {
            // Nothing precedes the kept tail.
            return Ok(messages.to_vec());
        }
        let span: Vec<Message> = rest[..split].iter().map(|m| (*m).clone()).collect();

        let summary = self.summarizer.summarize(&span).await?;

        let mut result = Vec::with_capacity(n + 2);
        result.extend(system.cloned());
        result.push(summary);
        result.extend(rest[split..].iter().map(|m| (*m).clone()));
        Ok(result)
    }

    /// Summarize the span in contiguous chunks, one summary per chunk
    async fn chunked(&self, k: usize, messages: &[Message]) -> ColloquyResult<Vec<Message>> {
        let (system, rest) = split_leading_system(messages);

        let mut result: Vec<Message> = Vec::new();
        result.extend(system.cloned());
        for chunk in rest.chunks(k) {
            let span: Vec<Message> = chunk.iter().map(|m| (*m).clone()).collect();
            result.push(self.summarizer.summarize(&span).await?);
        }
        Ok(result)
    }

    /// Summarize messages older than the cutoff, keep the rest verbatim
    ///
    /// Messages without a timestamp are treated as predating any cutoff.
    async fn from_timestamp(
        &self,
        cutoff: DateTime<Utc>,
        messages: &[Message],
    ) -> ColloquyResult<Vec<Message>> {
        let (system, rest) = split_leading_system(messages);

        let (old, recent): (Vec<&Message>, Vec<&Message>) = rest
            .into_iter()
            .partition(|m| m.timestamp.is_none_or(|ts| ts < cutoff));
        if old.is_empty() {
            return Ok(messages.to_vec());
        }

        let span: Vec<Message> = old.into_iter().cloned().collect();
        let summary = self.summarizer.summarize(&span).await?;

        let mut result = Vec::with_capacity(recent.len() + 2);
        result.extend(system.cloned());
        result.push(summary);
        result.extend(recent.into_iter().cloned());
        Ok(result)
    }

    /// Split at each system-message boundary and compact each section as a
    /// whole history
    ///
    /// Sections below the minimum span size are kept verbatim; the others
    /// collapse to `[system?, first user?, summary]` independently.
    async fn multi_system_sections(&self, messages: &[Message]) -> ColloquyResult<Vec<Message>> {
        let mut result = Vec::new();
        for section in split_sections(messages) {
            if section_span_len(section) < MIN_COMPACTABLE_MESSAGES {
                result.extend(section.iter().cloned());
            } else {
                result.extend(self.whole_history(section).await?);
            }
        }
        Ok(result)
    }
}

/// Split off the leading system message, if any
fn split_leading_system(messages: &[Message]) -> (Option<&Message>, Vec<&Message>) {
    match messages.first() {
        Some(first) if first.role == MessageRole::System => {
            (Some(first), messages[1..].iter().collect())
        }
        _ => (None, messages.iter().collect()),
    }
}

/// Split a message list into sections starting at each system message
fn split_sections(messages: &[Message]) -> Vec<&[Message]> {
    let mut sections = Vec::new();
    let mut start = 0;
    for (i, message) in messages.iter().enumerate() {
        if message.role == MessageRole::System && i > start {
            sections.push(&messages[start..i]);
            start = i;
        }
    }
    if start < messages.len() {
        sections.push(&messages[start..]);
    }
    sections
}

/// Span length of one section under whole-history semantics
fn section_span_len(section: &[Message]) -> usize {
    let (_, rest) = split_leading_system(section);
    let first_user = rest.iter().any(|m| m.role == MessageRole::User) as usize;
    rest.len().saturating_sub(first_user)
}

/// Length of the compactable span: the list minus the preserved head
///
/// The head is the leading system message, plus the first user message for
/// the whole-history family, which preserves it verbatim. Messages a
/// strategy keeps at the tail (`LastN`, `FromTimestamp`) still count toward
/// the span; the guard asks whether the conversation is long enough to be
/// worth compacting at all.
pub(crate) fn compactable_span_len(strategy: &CompactionStrategy, messages: &[Message]) -> usize {
    let (_, rest) = split_leading_system(messages);
    match strategy {
        CompactionStrategy::WholeHistory => {
            let first_user = rest.iter().any(|m| m.role == MessageRole::User) as usize;
            rest.len().saturating_sub(first_user)
        }
        CompactionStrategy::LastN(_)
        | CompactionStrategy::Chunked(_)
        | CompactionStrategy::FromTimestamp(_) => rest.len(),
        CompactionStrategy::MultiSystemSections => {
            split_sections(messages).iter().map(|s| section_span_len(s)).sum()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ColloquyError;
    use crate::history::summarizer::create_summary_message;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic summarizer counting how many spans it condensed
    struct FakeSummarizer {
        calls: AtomicUsize,
    }

    impl FakeSummarizer {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Summarizer for FakeSummarizer {
        async fn summarize(&self, messages: &[Message]) -> ColloquyResult<Message> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(create_summary_message(
                format!("TL;DR of {} messages", messages.len()),
                messages.len(),
            ))
        }
    }

    /// Summarizer that always fails
    struct FailingSummarizer;

    #[async_trait]
    impl Summarizer for FailingSummarizer {
        async fn summarize(&self, _messages: &[Message]) -> ColloquyResult<Message> {
            Err(ColloquyError::llm("model unavailable"))
        }
    }

    fn conversation(user_messages: usize) -> Vec<Message> {
        let mut messages = vec![Message::system("S")];
        for i in 1..=user_messages {
            messages.push(Message::user(format!("u{i}")));
        }
        messages
    }

    #[tokio::test]
    async fn test_whole_history() {
        let summarizer = FakeSummarizer::new();
        let compactor = HistoryCompactor::new(&summarizer);
        let messages = conversation(12);

        let outcome = compactor
            .compress(&CompactionStrategy::WholeHistory, &messages)
            .await;

        assert!(!outcome.used_fallback);
        assert_eq!(outcome.messages.len(), 3);
        assert_eq!(outcome.messages[0].role, MessageRole::System);
        assert_eq!(outcome.messages[1].content, "u1");
        assert!(outcome.messages[2].is_summary());
        assert_eq!(outcome.messages_dropped, 10);
        assert_eq!(summarizer.call_count(), 1);
    }

    #[tokio::test]
    async fn test_last_n() {
        let summarizer = FakeSummarizer::new();
        let compactor = HistoryCompactor::new(&summarizer);
        let messages = conversation(12); // System + u1..u12

        let outcome = compactor
            .compress(&CompactionStrategy::LastN(3), &messages)
            .await;

        // [System, TLDR, u10, u11, u12]
        assert_eq!(outcome.messages.len(), 5);
        assert_eq!(outcome.messages[0].role, MessageRole::System);
        assert!(outcome.messages[1].is_summary());
        assert_eq!(outcome.messages[1].content, "TL;DR of 9 messages");
        assert_eq!(outcome.messages[2].content, "u10");
        assert_eq!(outcome.messages[4].content, "u12");
        assert_eq!(outcome.messages_dropped, 8);
    }

    #[tokio::test]
    async fn test_last_n_larger_than_history_is_noop() {
        let summarizer = FakeSummarizer::new();
        let compactor = HistoryCompactor::new(&summarizer);
        let messages = conversation(12);

        let outcome = compactor
            .compress(&CompactionStrategy::LastN(20), &messages)
            .await;

        assert_eq!(outcome.messages.len(), messages.len());
        assert_eq!(outcome.messages_dropped, 0);
        assert_eq!(summarizer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_chunked_preserves_order() {
        let summarizer = FakeSummarizer::new();
        let compactor = HistoryCompactor::new(&summarizer);
        let messages = conversation(10);

        let outcome = compactor
            .compress(&CompactionStrategy::Chunked(4), &messages)
            .await;

        // 10 messages in chunks of 4 -> 3 summaries
        assert_eq!(summarizer.call_count(), 3);
        assert_eq!(outcome.messages.len(), 4);
        assert_eq!(outcome.messages[0].role, MessageRole::System);
        assert_eq!(outcome.messages[1].content, "TL;DR of 4 messages");
        assert_eq!(outcome.messages[3].content, "TL;DR of 2 messages");
    }

    #[tokio::test]
    async fn test_chunk_size_zero_skips() {
        let summarizer = FakeSummarizer::new();
        let compactor = HistoryCompactor::new(&summarizer);
        let messages = conversation(12);

        let outcome = compactor
            .compress(&CompactionStrategy::Chunked(0), &messages)
            .await;

        assert_eq!(outcome.messages.len(), messages.len());
        assert_eq!(outcome.messages_dropped, 0);
        assert_eq!(summarizer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_from_timestamp() {
        let summarizer = FakeSummarizer::new();
        let compactor = HistoryCompactor::new(&summarizer);
        let cutoff = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();

        let mut messages = vec![Message::system("S")];
        for i in 1..=10 {
            messages.push(Message::user(format!("old{i}")).with_timestamp(before));
        }
        messages.push(Message::user("untimestamped")); // counts as old
        messages.push(Message::user("recent1").with_timestamp(after));
        messages.push(Message::user("recent2").with_timestamp(after));

        let outcome = compactor
            .compress(&CompactionStrategy::FromTimestamp(cutoff), &messages)
            .await;

        // [System, TLDR, recent1, recent2]
        assert_eq!(outcome.messages.len(), 4);
        assert!(outcome.messages[1].is_summary());
        assert_eq!(outcome.messages[1].content, "TL;DR of 11 messages");
        assert_eq!(outcome.messages[2].content, "recent1");
    }

    #[tokio::test]
    async fn test_from_timestamp_nothing_old_is_noop() {
        let summarizer = FakeSummarizer::new();
        let compactor = HistoryCompactor::new(&summarizer);
        let cutoff = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();

        let mut messages = vec![Message::system("S")];
        for i in 1..=12 {
            messages.push(Message::user(format!("u{i}")).with_timestamp(after));
        }

        let outcome = compactor
            .compress(&CompactionStrategy::FromTimestamp(cutoff), &messages)
            .await;

        assert_eq!(outcome.messages.len(), messages.len());
        assert_eq!(summarizer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_multi_system_sections() {
        let summarizer = FakeSummarizer::new();
        let compactor = HistoryCompactor::new(&summarizer);

        let mut messages = Vec::new();
        messages.push(Message::system("S1"));
        for i in 1..=12 {
            messages.push(Message::user(format!("a{i}")));
        }
        messages.push(Message::system("S2"));
        messages.push(Message::user("b1"));
        messages.push(Message::user("b2"));

        let outcome = compactor
            .compress(&CompactionStrategy::MultiSystemSections, &messages)
            .await;

        // First section compacts to [S1, a1, TLDR]; second is below the
        // guard and survives verbatim.
        assert_eq!(summarizer.call_count(), 1);
        assert_eq!(outcome.messages[0].content, "S1");
        assert_eq!(outcome.messages[1].content, "a1");
        assert!(outcome.messages[2].is_summary());
        assert_eq!(outcome.messages[3].content, "S2");
        assert_eq!(outcome.messages[5].content, "b2");
        assert_eq!(outcome.messages.len(), 6);
    }

    #[tokio::test]
    async fn test_minimum_guard_skips_small_span() {
        let summarizer = FakeSummarizer::new();
        let compactor = HistoryCompactor::new(&summarizer);
        let messages = conversation(3);

        for strategy in [
            CompactionStrategy::WholeHistory,
            CompactionStrategy::LastN(1),
            CompactionStrategy::Chunked(2),
            CompactionStrategy::MultiSystemSections,
        ] {
            let outcome = compactor.compress(&strategy, &messages).await;
            assert_eq!(outcome.messages.len(), messages.len());
            assert_eq!(outcome.messages_dropped, 0);
            assert!(!outcome.used_fallback);
        }
        assert_eq!(summarizer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fallback_on_summarizer_failure() {
        let compactor = HistoryCompactor::new(&FailingSummarizer);
        let messages = conversation(20);

        let outcome = compactor
            .compress(&CompactionStrategy::WholeHistory, &messages)
            .await;

        assert!(outcome.used_fallback);
        assert_eq!(outcome.messages, messages);
        assert_eq!(outcome.messages_dropped, 0);
    }

    #[tokio::test]
    async fn test_system_never_summarized() {
        let summarizer = FakeSummarizer::new();
        let compactor = HistoryCompactor::new(&summarizer);
        let messages = conversation(15);

        for strategy in [
            CompactionStrategy::WholeHistory,
            CompactionStrategy::LastN(2),
            CompactionStrategy::Chunked(5),
        ] {
            let outcome = compactor.compress(&strategy, &messages).await;
            assert_eq!(outcome.messages[0].role, MessageRole::System);
            assert_eq!(outcome.messages[0].content, "S");
        }
    }

    #[tokio::test]
    async fn test_recompaction_is_noop() {
        let summarizer = FakeSummarizer::new();
        let compactor = HistoryCompactor::new(&summarizer);
        let messages = conversation(12);

        let first = compactor
            .compress(&CompactionStrategy::LastN(3), &messages)
            .await;
        let second = compactor
            .compress(&CompactionStrategy::LastN(3), &first.messages)
            .await;

        assert_eq!(second.messages, first.messages);
        assert_eq!(second.messages_dropped, 0);
    }

    #[test]
    fn test_split_sections() {
        let messages = vec![
            Message::user("pre"),
            Message::system("S1"),
            Message::user("a"),
            Message::system("S2"),
            Message::user("b"),
        ];

        let sections = split_sections(&messages);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].len(), 1);
        assert_eq!(sections[1][0].content, "S1");
        assert_eq!(sections[2][0].content, "S2");
    }
}
