//! Message format conversion at the provider call boundary
//!
//! Internal [`Message`] values carry tool calls inline on the assistant
//! message; providers expect one wire entry per tool call. The bridge
//! expands on the way out and folds the sequence back into a single
//! assistant message on the way in. Conversion is a pure mapping and never
//! silently drops content; provider-side extras that have no internal
//! representation are discarded on ingest.

use crate::llm::messages::{Message, MessageRole};
use crate::tools::ToolCall;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Error raised when a message cannot be converted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// A tool call or tool result entry lacks its required identifier
    #[error("message at index {index} is missing a tool call id")]
    MissingToolId { index: usize },
}

/// Role of a wire-level provider message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderRole {
    System,
    User,
    Assistant,
    Tool,
}

/// A message in the provider's wire representation
///
/// Tool calls are flattened: an entry either carries plain text, one tool
/// call (`tool_name` + `arguments` set), or one tool result (`tool_call_id`
/// set on a `Tool` role entry). Unknown provider fields land in `extra` and
/// are dropped when converting back to the internal model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderMessage {
    /// Wire role
    pub role: ProviderRole,
    /// Text content
    #[serde(default)]
    pub content: String,
    /// Identifier linking tool calls to their results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Tool name (tool-call and tool-result entries)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    /// Tool call arguments (tool-call entries)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
    /// Provider-side metadata with no internal representation
    #[serde(flatten, default)]
    pub extra: HashMap<String, Value>,
}

impl ProviderMessage {
    /// Create a plain text entry
    pub fn text(role: ProviderRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_call_id: None,
            tool_name: None,
            arguments: None,
            extra: HashMap::new(),
        }
    }

    /// Create a tool-call entry
    pub fn tool_call(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            role: ProviderRole::Assistant,
            content: String::new(),
            tool_call_id: Some(id.into()),
            tool_name: Some(name.into()),
            arguments: Some(arguments),
            extra: HashMap::new(),
        }
    }

    /// Create a tool-result entry
    pub fn tool_result(
        id: impl Into<String>,
        name: Option<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: ProviderRole::Tool,
            content: content.into(),
            tool_call_id: Some(id.into()),
            tool_name: name,
            arguments: None,
            extra: HashMap::new(),
        }
    }

    /// Check whether this entry encodes a tool call
    pub fn is_tool_call(&self) -> bool {
        self.role == ProviderRole::Assistant && self.tool_name.is_some()
    }
}

/// Converter between internal and provider message representations
pub struct MessageBridge;

impl MessageBridge {
    /// Expand a single internal message into its wire entries
    ///
    /// Most messages map to exactly one entry; an assistant message
    /// carrying N tool calls expands to a text entry (when content is
    /// non-empty) followed by N tool-call entries. The `index` is the
    /// message's position in the source list, used for error reporting.
    pub fn expand(message: &Message, index: usize) -> Result<Vec<ProviderMessage>, ConversionError> {
        match message.role {
            MessageRole::System => Ok(vec![ProviderMessage::text(
                ProviderRole::System,
                message.content.clone(),
            )]),
            MessageRole::User => Ok(vec![ProviderMessage::text(
                ProviderRole::User,
                message.content.clone(),
            )]),
            MessageRole::Assistant => {
                let calls = message.tool_calls.as_deref().unwrap_or(&[]);
                if calls.is_empty() {
                    return Ok(vec![ProviderMessage::text(
                        ProviderRole::Assistant,
                        message.content.clone(),
                    )]);
                }

                let mut entries = Vec::with_capacity(calls.len() + 1);
                if !message.content.is_empty() {
                    entries.push(ProviderMessage::text(
                        ProviderRole::Assistant,
                        message.content.clone(),
                    ));
                }
                for call in calls {
                    if call.id.is_empty() {
                        return Err(ConversionError::MissingToolId { index });
                    }
                    entries.push(ProviderMessage::tool_call(
                        call.id.clone(),
                        call.name.clone(),
                        call.arguments_value(),
                    ));
                }
                Ok(entries)
            }
            MessageRole::Tool => {
                let id = message
                    .tool_call_id
                    .as_deref()
                    .filter(|id| !id.is_empty())
                    .ok_or(ConversionError::MissingToolId { index })?;
                Ok(vec![ProviderMessage::tool_result(
                    id,
                    message.name.clone(),
                    message.content.clone(),
                )])
            }
        }
    }

    /// Convert a message list into its wire representation
    pub fn to_provider(messages: &[Message]) -> Result<Vec<ProviderMessage>, ConversionError> {
        let mut entries = Vec::with_capacity(messages.len());
        for (index, message) in messages.iter().enumerate() {
            entries.extend(Self::expand(message, index)?);
        }
        Ok(entries)
    }

    /// Convert wire entries back into the internal representation
    ///
    /// A run of assistant tool-call entries (optionally preceded by an
    /// assistant text entry) folds back into one assistant message carrying
    /// all the calls. Provider extras are discarded.
    pub fn from_provider(entries: &[ProviderMessage]) -> Result<Vec<Message>, ConversionError> {
        let mut messages: Vec<Message> = Vec::with_capacity(entries.len());
        let mut pending: Option<Message> = None;

        for (index, entry) in entries.iter().enumerate() {
            if entry.is_tool_call() {
                let id = entry
                    .tool_call_id
                    .as_deref()
                    .filter(|id| !id.is_empty())
                    .ok_or(ConversionError::MissingToolId { index })?;
                let name = entry.tool_name.as_deref().unwrap_or_default();
                let call = ToolCall::from_value(
                    id,
                    name,
                    entry.arguments.clone().unwrap_or(Value::Null),
                );

                let assistant = pending
                    .get_or_insert_with(|| Message::assistant(entry.content.clone()));
                assistant.tool_calls.get_or_insert_with(Vec::new).push(call);
                continue;
            }

            if let Some(done) = pending.take() {
                messages.push(done);
            }

            match entry.role {
                ProviderRole::System => messages.push(Message::system(entry.content.clone())),
                ProviderRole::User => messages.push(Message::user(entry.content.clone())),
                ProviderRole::Assistant => {
                    // Text entry; may be extended by following tool-call entries.
                    pending = Some(Message::assistant(entry.content.clone()));
                }
                ProviderRole::Tool => {
                    let id = entry
                        .tool_call_id
                        .as_deref()
                        .filter(|id| !id.is_empty())
                        .ok_or(ConversionError::MissingToolId { index })?;
                    messages.push(Message::tool(
                        entry.content.clone(),
                        id.to_string(),
                        entry.tool_name.clone(),
                    ));
                }
            }
        }

        if let Some(done) = pending.take() {
            messages.push(done);
        }

        Ok(messages)
    }
}
