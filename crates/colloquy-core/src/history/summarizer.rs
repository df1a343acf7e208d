//! Conversation summarization for history compaction
//!
//! Summarization is an injected capability: the compactor only sees the
//! [`Summarizer`] trait, so the history core stays testable with a
//! deterministic fake while production wires in [`LlmSummarizer`], which
//! delegates the actual TL;DR generation to one model-completion call.

use crate::error::ColloquyResult;
use crate::llm::{
    COMPACTION_ID_KEY, LlmClient, Message, MessageBridge, MessageRole, SUMMARIZED_COUNT_KEY,
    SUMMARY_KEY,
};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Capability that condenses a span of messages into one synthetic message
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize the given span into a single assistant message
    async fn summarize(&self, messages: &[Message]) -> ColloquyResult<Message>;
}

/// Build the synthetic assistant message standing in for a compacted span
pub fn create_summary_message(content: impl Into<String>, summarized_count: usize) -> Message {
    Message::assistant(content)
        .with_metadata(SUMMARY_KEY, true)
        .with_metadata(COMPACTION_ID_KEY, Uuid::new_v4().to_string())
        .with_metadata(SUMMARIZED_COUNT_KEY, summarized_count)
}

/// Summarizer that delegates to an LLM client
#[derive(Clone)]
pub struct LlmSummarizer {
    /// Client used for the summarization call
    client: Arc<dyn LlmClient>,
    /// Soft cap on the summary length, stated in the prompt
    max_summary_tokens: usize,
}

impl LlmSummarizer {
    /// Create a summarizer over the given client
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            max_summary_tokens: 500,
        }
    }

    /// Set the maximum summary length
    pub fn with_max_tokens(mut self, max: usize) -> Self {
        self.max_summary_tokens = max;
        self
    }

    /// Build the prompt for the summarization call
    fn build_prompt(&self, messages: &[Message]) -> String {
        let conversation = format_span(messages);

        format!(
            r#"Please summarize the following conversation concisely, preserving:

1. Key decisions and outcomes
2. Important tool results and findings
3. Current task context and progress
4. Any critical errors or warnings encountered

Be concise but comprehensive. Focus on information that would be needed to continue the conversation effectively.

Maximum summary length: {} tokens.

---
CONVERSATION TO SUMMARIZE:
{}
---

Provide a structured summary:"#,
            self.max_summary_tokens, conversation
        )
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, messages: &[Message]) -> ColloquyResult<Message> {
        let prompt = vec![Message::user(self.build_prompt(messages))];
        let wire = MessageBridge::to_provider(&prompt)?;
        let response = self.client.chat(&wire, None).await?;

        Ok(create_summary_message(
            format!(
                "# Previous Conversation Summary\n\n{}\n\n---\n*Summarized {} messages*",
                response.content,
                messages.len()
            ),
            messages.len(),
        ))
    }
}

/// Format a span of messages for the summarization prompt
fn format_span(messages: &[Message]) -> String {
    messages
        .iter()
        .filter(|m| m.role != MessageRole::System)
        .map(|m| {
            let role = match m.role {
                MessageRole::User => "USER",
                MessageRole::Assistant => "ASSISTANT",
                MessageRole::Tool => "TOOL",
                MessageRole::System => "SYSTEM",
            };

            let tool_info = if let Some(ref calls) = m.tool_calls {
                let names: Vec<_> = calls.iter().map(|tc| tc.name.as_str()).collect();
                format!(" [Tools: {}]", names.join(", "))
            } else if let Some(ref id) = m.tool_call_id {
                format!(" [Response to: {id}]")
            } else {
                String::new()
            };

            format!("{}{}: {}", role, tool_info, truncate(&m.content, 500))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Truncate content to at most `max_chars` on a char boundary
fn truncate(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        content.to_string()
    } else {
        let cut: String = content.chars().take(max_chars).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmResponse, ModelParameters, ProviderMessage};
    use crate::tools::{ToolCall, ToolSchema};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Client that records the request and returns a canned completion
    struct RecordingClient {
        params: ModelParameters,
        last_prompt: Mutex<Option<String>>,
    }

    impl RecordingClient {
        fn new() -> Self {
            Self {
                params: ModelParameters::new("test", "test-model"),
                last_prompt: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl LlmClient for RecordingClient {
        async fn chat(
            &self,
            messages: &[ProviderMessage],
            _tools: Option<&[ToolSchema]>,
        ) -> ColloquyResult<LlmResponse> {
            *self.last_prompt.lock().unwrap() = messages.first().map(|m| m.content.clone());
            Ok(LlmResponse::new("The user asked about sorting."))
        }

        fn parameters(&self) -> &ModelParameters {
            &self.params
        }
    }

    fn span() -> Vec<Message> {
        vec![
            Message::user("Hello, can you help me sort an array?"),
            Message::assistant("Of course! What language?"),
            Message::user("Rust, please."),
        ]
    }

    #[tokio::test]
    async fn test_llm_summarizer_produces_marked_summary() {
        let client = Arc::new(RecordingClient::new());
        let summarizer = LlmSummarizer::new(client.clone());

        let summary = summarizer.summarize(&span()).await.unwrap();

        assert_eq!(summary.role, MessageRole::Assistant);
        assert!(summary.is_summary());
        assert!(summary.content.contains("The user asked about sorting."));
        assert!(summary.content.contains("Summarized 3 messages"));
        assert!(summary.metadata.contains_key(COMPACTION_ID_KEY));

        let prompt = client.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("CONVERSATION TO SUMMARIZE"));
        assert!(prompt.contains("USER: Hello, can you help me sort an array?"));
    }

    #[tokio::test]
    async fn test_prompt_states_token_cap() {
        let client = Arc::new(RecordingClient::new());
        let summarizer = LlmSummarizer::new(client.clone()).with_max_tokens(300);

        summarizer.summarize(&span()).await.unwrap();

        let prompt = client.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("300 tokens"));
    }

    #[test]
    fn test_format_span_skips_system() {
        let messages = vec![
            Message::system("instructions"),
            Message::user("question"),
        ];
        let formatted = format_span(&messages);
        assert!(!formatted.contains("instructions"));
        assert!(formatted.contains("USER: question"));
    }

    #[test]
    fn test_format_span_tool_annotations() {
        let call = ToolCall::new("c1", "grep", HashMap::new());
        let messages = vec![
            Message::assistant_with_tools("searching", vec![call]),
            Message::tool("matches", "c1", Some("grep")),
        ];
        let formatted = format_span(&messages);
        assert!(formatted.contains("[Tools: grep]"));
        assert!(formatted.contains("[Response to: c1]"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");

        let long = "This is a very long message that should be truncated";
        let truncated = truncate(long, 20);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 23);
    }

    #[test]
    fn test_create_summary_message() {
        let summary = create_summary_message("TL;DR", 12);
        assert!(summary.is_summary());
        assert_eq!(
            summary.metadata.get(SUMMARIZED_COUNT_KEY),
            Some(&serde_json::json!(12))
        );
    }
}
