//! Agent step loop
//!
//! The agent owns a conversation and drives it against a provider client:
//! each turn runs the history pipeline over the accumulated messages,
//! bridges the reduced list to the wire representation, issues the chat
//! call, executes any requested tools, and loops until the model stops
//! calling tools or the step limit is reached.

use crate::error::{ColloquyError, ColloquyResult};
use crate::history::{HistoryConfig, HistoryManager, LlmSummarizer};
use crate::llm::{LlmClient, LlmResponse, Message, MessageBridge};
use crate::tools::{Tool, ToolResult, ToolSchema};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

/// Default cap on model calls per user turn
pub const DEFAULT_MAX_STEPS: u32 = 20;

/// Options controlling agent execution
#[derive(Debug, Clone)]
pub struct AgentOptions {
    /// History controls applied before every model call
    pub history: HistoryConfig,
    /// Maximum model calls per user turn
    pub max_steps: u32,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            history: HistoryConfig::default(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl AgentOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the history configuration
    pub fn with_history(mut self, history: HistoryConfig) -> Self {
        self.history = history;
        self
    }

    /// Set the step limit
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }
}

/// A conversation-owning agent over an LLM client
pub struct Agent {
    /// Provider client used for completions
    client: Arc<dyn LlmClient>,
    /// Registered tools, by name
    tools: HashMap<String, Arc<dyn Tool>>,
    /// History pipeline shared across turns
    history: HistoryManager,
    /// Execution options
    options: AgentOptions,
    /// The accumulated conversation
    messages: Vec<Message>,
}

impl Agent {
    /// Create an agent with a system prompt
    ///
    /// Summarization for compaction is delegated to the same client the
    /// agent talks to; use [`Agent::with_history_manager`] to supply a
    /// different summarizer or estimator.
    pub fn new(client: Arc<dyn LlmClient>, system_prompt: impl Into<String>) -> Self {
        let summarizer = LlmSummarizer::new(client.clone());
        let history = HistoryManager::new(Arc::new(summarizer));
        Self {
            client,
            tools: HashMap::new(),
            history,
            options: AgentOptions::default(),
            messages: vec![Message::system(system_prompt).with_timestamp(Utc::now())],
        }
    }

    /// Replace the history manager
    pub fn with_history_manager(mut self, history: HistoryManager) -> Self {
        self.history = history;
        self
    }

    /// Set execution options
    pub fn with_options(mut self, options: AgentOptions) -> Self {
        self.options = options;
        self
    }

    /// Register a tool
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.insert(tool.name().to_string(), tool);
        self
    }

    /// The accumulated conversation
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Schemas for all registered tools
    pub fn tool_schemas(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|t| t.schema()).collect()
    }

    /// Run one user turn to completion
    ///
    /// Returns the final model response of the turn. The conversation
    /// retains every message produced along the way; only the list sent to
    /// the provider is reduced by the history pipeline.
    pub async fn step(&mut self, user_input: impl Into<String>) -> ColloquyResult<LlmResponse> {
        self.messages
            .push(Message::user(user_input).with_timestamp(Utc::now()));

        let schemas = self.tool_schemas();
        let tools = (!schemas.is_empty()).then_some(schemas.as_slice());

        for step in 1..=self.options.max_steps {
            let prepared = self
                .history
                .apply(self.messages.clone(), &self.options.history)
                .await?;
            let wire = MessageBridge::to_provider(&prepared)?;

            let response = self.client.chat(&wire, tools).await?;

            if response.tool_calls.is_empty() {
                self.messages.push(
                    Message::assistant(response.content.clone()).with_timestamp(Utc::now()),
                );
                return Ok(response);
            }

            tracing::debug!(
                "Step {}: executing {} tool call(s)",
                step,
                response.tool_calls.len()
            );
            self.messages.push(
                Message::assistant_with_tools(
                    response.content.clone(),
                    response.tool_calls.clone(),
                )
                .with_timestamp(Utc::now()),
            );

            for call in &response.tool_calls {
                let result = match self.tools.get(&call.name) {
                    Some(tool) => tool.execute(call).await.unwrap_or_else(|err| {
                        ToolResult::error(call.id.clone(), call.name.clone(), err.to_string())
                    }),
                    None => ToolResult::error(
                        call.id.clone(),
                        call.name.clone(),
                        format!("unknown tool: {}", call.name),
                    ),
                };
                self.messages
                    .push(result.into_message().with_timestamp(Utc::now()));
            }
        }

        Err(ColloquyError::agent(format!(
            "step limit of {} reached without a final response",
            self.options.max_steps
        )))
    }
}
