//! OpenAI chat-completions wire types.
//!
//! Private to this crate: callers only ever see the `pipeline` message types.

use pipeline::{
    ChatMessage, ChatRole, Completion, CompletionRequest, LlmError, ResponseFormat, ToolCall,
    TokenUsage,
};
use serde::{Deserialize, Serialize};

// ── Request ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<WireTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<WireResponseFormat>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
}

impl<'a> ChatCompletionRequest<'a> {
    pub fn new(model: &'a str, request: CompletionRequest, stream: bool) -> Self {
        Self {
            model,
            messages: request.messages.into_iter().map(WireMessage::from).collect(),
            tools: request
                .tools
                .into_iter()
                .map(|t| WireTool {
                    kind: "function",
                    function: WireFunctionDecl {
                        name: t.name,
                        description: t.description,
                        parameters: t.parameters,
                    },
                })
                .collect(),
            temperature: request.temperature,
            response_format: request.response_format.map(WireResponseFormat::from),
            stream,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct WireMessage {
    role: ChatRole,
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCallOut>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl From<ChatMessage> for WireMessage {
    fn from(m: ChatMessage) -> Self {
        Self {
            role: m.role,
            content: m.content,
            tool_calls: m
                .tool_calls
                .into_iter()
                .map(|c| WireToolCallOut {
                    id: c.id,
                    kind: "function",
                    function: WireFunctionCall {
                        name: c.name,
                        arguments: match c.arguments {
                            serde_json::Value::String(raw) => raw,
                            other => other.to_string(),
                        },
                    },
                })
                .collect(),
            tool_call_id: m.tool_call_id,
        }
    }
}

#[derive(Debug, Serialize)]
struct WireToolCallOut {
    id: String,
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunctionDecl,
}

#[derive(Debug, Serialize)]
struct WireFunctionDecl {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum WireResponseFormat {
    JsonObject,
    JsonSchema { json_schema: WireJsonSchema },
}

#[derive(Debug, Serialize)]
pub(crate) struct WireJsonSchema {
    name: String,
    schema: serde_json::Value,
    strict: bool,
}

impl From<ResponseFormat> for WireResponseFormat {
    fn from(f: ResponseFormat) -> Self {
        match f {
            ResponseFormat::JsonObject => Self::JsonObject,
            ResponseFormat::JsonSchema { name, schema } => Self::JsonSchema {
                json_schema: WireJsonSchema {
                    name,
                    schema,
                    strict: true,
                },
            },
        }
    }
}

// ── Response ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCallIn>>,
}

#[derive(Debug, Deserialize)]
struct WireToolCallIn {
    id: String,
    function: WireFunctionCall,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct WireUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

impl From<WireUsage> for TokenUsage {
    fn from(u: WireUsage) -> Self {
        TokenUsage::new(u.prompt_tokens, u.completion_tokens)
    }
}

impl ChatCompletionResponse {
    /// Takes the first choice as the model's turn.
    pub fn into_completion(self) -> Result<Completion, LlmError> {
        let usage = self.usage.map(TokenUsage::from).unwrap_or_default();
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse {
                message: "response contained no choices".to_string(),
            })?;

        Ok(Completion {
            content: choice.message.content.filter(|c| !c.is_empty()),
            tool_calls: choice
                .message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(|c| ToolCall {
                    id: c.id,
                    arguments: parse_arguments(&c.function.arguments),
                    name: c.function.name,
                })
                .collect(),
            usage,
            finish_reason: choice.finish_reason,
        })
    }
}

// ── Streaming chunks ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    #[serde(default)]
    pub usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChunkChoice {
    #[serde(default)]
    pub delta: Delta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Delta {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCallDelta>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ToolCallDelta {
    pub index: usize,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub function: Option<FunctionDelta>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FunctionDelta {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<String>,
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Error envelope used by OpenAI and compatible APIs.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
    #[serde(default)]
    pub code: Option<serde_json::Value>,
}

/// Tool arguments arrive as a JSON-encoded string. Empty means no arguments;
/// text that is not JSON is kept verbatim as a JSON string.
pub(crate) fn parse_arguments(raw: &str) -> serde_json::Value {
    if raw.trim().is_empty() {
        return serde_json::Value::Object(Default::default());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}
