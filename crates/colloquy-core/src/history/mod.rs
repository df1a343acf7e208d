//! Conversation history management
//!
//! This module decides, before every model call, which messages are sent
//! and how an oversized or overlong conversation is reduced. Three
//! independent controls compose in a fixed precedence order:
//!
//! 1. Compaction: opt-in summarization of older messages into a TL;DR
//! 2. Token budget: drop oldest non-system messages until the estimate fits
//! 3. Message-count cap: keep the system message plus the most recent N
//!
//! # Example
//!
//! ```rust,ignore
//! use colloquy_core::history::{CompactionStrategy, HistoryConfig, HistoryManager};
//!
//! let manager = HistoryManager::new(summarizer);
//! let config = HistoryConfig::new()
//!     .with_compaction(CompactionStrategy::LastN(10))
//!     .with_max_tokens(100_000);
//!
//! let prepared = manager.apply(messages, &config).await?;
//! ```

pub mod compactor;
pub mod config;
pub mod error;
pub mod estimator;
pub mod manager;
pub mod strategy;
pub mod summarizer;

pub use compactor::{CompactionOutcome, HistoryCompactor, MIN_COMPACTABLE_MESSAGES};
pub use config::HistoryConfig;
pub use error::CompressionError;
pub use estimator::TokenEstimator;
pub use manager::HistoryManager;
pub use strategy::CompactionStrategy;
pub use summarizer::{LlmSummarizer, Summarizer, create_summary_message};
