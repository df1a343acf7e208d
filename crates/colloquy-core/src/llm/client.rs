//! Provider client seam
//!
//! This crate never talks to a provider directly. [`LlmClient`] is the
//! boundary: implementations own the transport, authentication, and retry
//! policy; everything here consumes the trait. Parameters are constructed
//! explicitly and injected at the call site.

use crate::error::ColloquyResult;
use crate::llm::bridge::ProviderMessage;
use crate::llm::messages::LlmResponse;
use crate::tools::ToolSchema;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Model call parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Provider identifier (e.g. "anthropic", "openai")
    pub provider: String,
    /// Model name
    pub model: String,
    /// API key, if the transport needs one
    pub api_key: Option<String>,
    /// Maximum completion tokens
    pub max_tokens: Option<usize>,
    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl ModelParameters {
    /// Create parameters for a provider/model pair
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            api_key: None,
            max_tokens: None,
            temperature: None,
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the completion token limit
    pub fn with_max_tokens(mut self, max: usize) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Client capable of one model completion call
///
/// Consumes the bridge's wire representation; the history pipeline runs
/// before conversion, so implementations see the already-reduced list.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Issue a chat completion for the given messages and tool schemas
    async fn chat(
        &self,
        messages: &[ProviderMessage],
        tools: Option<&[ToolSchema]>,
    ) -> ColloquyResult<LlmResponse>;

    /// Parameters this client was constructed with
    fn parameters(&self) -> &ModelParameters;
}
