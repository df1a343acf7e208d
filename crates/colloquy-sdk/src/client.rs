//! SDK client implementation

use colloquy_core::agent::{Agent, AgentOptions, DEFAULT_MAX_STEPS};
use colloquy_core::error::ColloquyResult;
use colloquy_core::history::{HistoryConfig, HistoryManager};
use colloquy_core::llm::{LlmClient, Message, TokenUsage};
use colloquy_core::tools::Tool;
use std::sync::Arc;

/// Per-call options for a task run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// History controls for this run, overriding the client default
    pub history: Option<HistoryConfig>,
    /// Step limit for this run, overriding the client default
    pub max_steps: Option<u32>,
}

impl RunOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the history configuration
    pub fn with_history(mut self, history: HistoryConfig) -> Self {
        self.history = Some(history);
        self
    }

    /// Override the step limit
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = Some(max_steps);
        self
    }
}

/// Result of a task run
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// The final model output
    pub final_output: String,
    /// The full conversation, including tool traffic
    pub messages: Vec<Message>,
    /// Usage reported for the final model call
    pub usage: Option<TokenUsage>,
}

/// High-level client for running Colloquy agents
///
/// Configure once with the builder methods, then call [`run`] per task.
/// Each run gets a fresh conversation; the provider client, tools, and
/// default history configuration are shared.
///
/// [`run`]: ColloquyClient::run
pub struct ColloquyClient {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
    tools: Vec<Arc<dyn Tool>>,
    history: HistoryConfig,
    history_manager: Option<HistoryManager>,
    max_steps: u32,
}

impl ColloquyClient {
    /// Create a client over the given provider client
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            system_prompt: String::new(),
            tools: Vec::new(),
            history: HistoryConfig::default(),
            history_manager: None,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Set the system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Register a tool
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Set the default history configuration
    pub fn with_history_config(mut self, history: HistoryConfig) -> Self {
        self.history = history;
        self
    }

    /// Use a custom history manager (summarizer and estimator)
    pub fn with_history_manager(mut self, manager: HistoryManager) -> Self {
        self.history_manager = Some(manager);
        self
    }

    /// Set the default step limit
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Run a task with the client defaults
    pub async fn run(&self, task: &str) -> ColloquyResult<ExecutionResult> {
        self.run_with_options(task, RunOptions::default()).await
    }

    /// Run a task with per-call options
    pub async fn run_with_options(
        &self,
        task: &str,
        options: RunOptions,
    ) -> ColloquyResult<ExecutionResult> {
        let history = options.history.unwrap_or_else(|| self.history.clone());
        let max_steps = options.max_steps.unwrap_or(self.max_steps);

        tracing::debug!(
            "Running task with {} tool(s), step limit {}",
            self.tools.len(),
            max_steps
        );

        let mut agent = Agent::new(self.llm.clone(), self.system_prompt.clone()).with_options(
            AgentOptions::new()
                .with_history(history)
                .with_max_steps(max_steps),
        );
        if let Some(manager) = &self.history_manager {
            agent = agent.with_history_manager(manager.clone());
        }
        for tool in &self.tools {
            agent = agent.with_tool(tool.clone());
        }

        let response = agent.step(task).await?;

        Ok(ExecutionResult {
            final_output: response.content.clone(),
            messages: agent.messages().to_vec(),
            usage: response.usage,
        })
    }
}
