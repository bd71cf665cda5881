//! LLM provider port.
//!
//! [`LlmProvider`] is the only way the orchestration layer talks to a model.
//! Concrete backends (GitHub Models, Azure OpenAI, Ollama, OpenAI) live in
//! the `llm` crate; tests use scripted in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ModelId, TokenUsage};

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}

/// A function call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Backend-assigned id; echoed back on the tool result message.
    pub id: String,
    /// Name of the tool the model wants to run.
    pub name: String,
    /// Parsed JSON arguments. Arguments that are not valid JSON are kept as
    /// a JSON string so the tool can report them.
    pub arguments: serde_json::Value,
}

/// One entry of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: Option<String>,
    /// Set on assistant messages that requested tool calls.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Set on tool messages: the call this message answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn text(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::text(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(ChatRole::Assistant, content)
    }

    /// Assistant turn that requested `calls` (with optional accompanying text).
    pub fn assistant_tool_calls(content: Option<String>, calls: Vec<ToolCall>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content,
            tool_calls: calls,
            tool_call_id: None,
        }
    }

    /// Result of running the tool call `call_id`.
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Tool,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: Some(call_id.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Requests and responses
// ---------------------------------------------------------------------------

/// Function-tool declaration sent with a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object.
    pub parameters: serde_json::Value,
}

/// Structured output constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResponseFormat {
    /// Any JSON object.
    JsonObject,
    /// JSON matching `schema`, named `name` on the wire.
    JsonSchema {
        name: String,
        schema: serde_json::Value,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
    pub temperature: Option<f32>,
    pub response_format: Option<ResponseFormat>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }
}

/// One model turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub usage: TokenUsage,
    pub finish_reason: Option<String>,
}

impl Completion {
    /// Plain text turn with no tool calls.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures of a single LLM call. None are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmError {
    /// The request never produced an HTTP response.
    #[error("LLM transport error: {message}")]
    Transport { message: String },

    /// The request exceeded the configured timeout.
    #[error("LLM request timed out")]
    Timeout,

    /// The backend answered with a non-success status.
    #[error("LLM backend returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The response body could not be understood.
    #[error("Invalid LLM response: {message}")]
    InvalidResponse { message: String },
}

// ---------------------------------------------------------------------------
// Port
// ---------------------------------------------------------------------------

/// Receives streamed text fragments. Each fragment is only borrowed for the
/// duration of the call.
pub type DeltaSink<'a> = &'a mut (dyn for<'s> FnMut(&'s str) + Send);

/// A chat-completion backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Model or deployment this provider sends requests to.
    fn model(&self) -> &ModelId;

    /// Performs one completion round-trip.
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError>;

    /// Performs one completion, handing text fragments to `on_delta` as they
    /// arrive. The returned [`Completion`] holds the fully assembled turn.
    ///
    /// The default implementation delivers the whole text as one fragment.
    async fn complete_streaming(
        &self,
        request: CompletionRequest,
        on_delta: DeltaSink<'_>,
    ) -> Result<Completion, LlmError> {
        let completion = self.complete(request).await?;
        if let Some(text) = &completion.content {
            on_delta(text);
        }
        Ok(completion)
    }
}
