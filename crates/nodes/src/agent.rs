//! A model-backed agent that can call tools.
//!
//! [`ChatAgent::run`] drives the think/act loop: the model is asked for a
//! turn; if it requests tool calls they are executed in order, their results
//! are appended as tool messages, and the model is asked again. The loop ends
//! when the model answers with plain text or the tool-round limit is hit.

use std::sync::Arc;

use pipeline::{
    AgentName, ChatMessage, CompletionRequest, DeltaSink, LlmError, LlmProvider, ResponseFormat,
    TokenUsage,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::tools::ToolSet;

/// Tool rounds allowed per run before the run fails.
pub const DEFAULT_MAX_TOOL_ROUNDS: u32 = 10;

/// Failures of one agent run.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Agent {agent}: {source}")]
    Llm {
        agent: AgentName,
        #[source]
        source: LlmError,
    },

    #[error("Agent {agent} requested tools for more than {limit} rounds")]
    ToolRoundsExceeded { agent: AgentName, limit: u32 },
}

/// Outcome of one agent run.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentResponse {
    /// Final assistant text. Empty if the model returned no content.
    pub text: String,
    /// Usage summed over every round of the run.
    pub usage: TokenUsage,
    /// The full conversation, system message first, final answer last.
    pub messages: Vec<ChatMessage>,
    pub tool_calls_made: usize,
}

#[derive(Clone)]
pub struct ChatAgent {
    name: AgentName,
    description: String,
    instructions: String,
    provider: Arc<dyn LlmProvider>,
    tools: ToolSet,
    response_format: Option<ResponseFormat>,
    temperature: Option<f32>,
    max_tool_rounds: u32,
}

impl std::fmt::Debug for ChatAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatAgent")
            .field("name", &self.name)
            .field("model", self.provider.model())
            .field("tools", &self.tools)
            .field("max_tool_rounds", &self.max_tool_rounds)
            .finish_non_exhaustive()
    }
}

impl ChatAgent {
    pub fn new(
        name: AgentName,
        instructions: impl Into<String>,
        provider: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            name,
            description: String::new(),
            instructions: instructions.into(),
            provider,
            tools: ToolSet::new(),
            response_format: None,
            temperature: None,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    /// What the agent is good at. Shown to round-table managers and used as
    /// the tool description when the agent is delegated to.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tools(mut self, tools: ToolSet) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tool_rounds(mut self, rounds: u32) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    pub fn name(&self) -> &AgentName {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    /// Runs the agent on a single user message.
    pub async fn run(&self, input: &str) -> Result<AgentResponse, AgentError> {
        self.run_messages(vec![ChatMessage::user(input)]).await
    }

    /// Runs the agent on an existing conversation (without a system message;
    /// the agent's instructions are prepended).
    #[tracing::instrument(skip_all, fields(agent = %self.name))]
    pub async fn run_messages(
        &self,
        history: Vec<ChatMessage>,
    ) -> Result<AgentResponse, AgentError> {
        self.drive(history, None).await
    }

    /// Like [`run_messages`](Self::run_messages), handing assistant text
    /// fragments to `on_delta` as they stream in.
    #[tracing::instrument(skip_all, fields(agent = %self.name))]
    pub async fn run_streaming(
        &self,
        history: Vec<ChatMessage>,
        on_delta: DeltaSink<'_>,
    ) -> Result<AgentResponse, AgentError> {
        self.drive(history, Some(on_delta)).await
    }

    async fn drive(
        &self,
        history: Vec<ChatMessage>,
        mut on_delta: Option<DeltaSink<'_>>,
    ) -> Result<AgentResponse, AgentError> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(self.instructions.clone()));
        messages.extend(history);

        let mut usage = TokenUsage::default();
        let mut tool_calls_made = 0;
        let mut rounds = 0;

        loop {
            let request = self.request(messages.clone());
            debug!(messages = request.messages.len(), tools = request.tools.len(), "requesting turn");

            let turn = match on_delta.as_deref_mut() {
                Some(sink) => self.provider.complete_streaming(request, sink).await,
                None => self.provider.complete(request).await,
            };
            let completion = turn.map_err(|source| AgentError::Llm {
                agent: self.name.clone(),
                source,
            })?;
            usage += completion.usage;

            if !completion.has_tool_calls() {
                let text = completion.content.unwrap_or_default();
                if text.is_empty() {
                    warn!(finish_reason = ?completion.finish_reason, "model returned no content");
                }
                messages.push(ChatMessage::assistant(text.clone()));
                info!(
                    rounds,
                    tool_calls_made,
                    tokens = %usage.total(),
                    "agent finished"
                );
                return Ok(AgentResponse {
                    text,
                    usage,
                    messages,
                    tool_calls_made,
                });
            }

            if rounds >= self.max_tool_rounds {
                return Err(AgentError::ToolRoundsExceeded {
                    agent: self.name.clone(),
                    limit: self.max_tool_rounds,
                });
            }
            rounds += 1;

            let calls = completion.tool_calls;
            messages.push(ChatMessage::assistant_tool_calls(
                completion.content,
                calls.clone(),
            ));
            for call in &calls {
                let result = self.tools.invoke(call).await;
                messages.push(ChatMessage::tool_result(call.id.clone(), result));
                tool_calls_made += 1;
            }
        }
    }

    fn request(&self, messages: Vec<ChatMessage>) -> CompletionRequest {
        CompletionRequest {
            messages,
            tools: self.tools.definitions(),
            temperature: self.temperature,
            response_format: self.response_format.clone(),
        }
    }
}

/// Builds an `AgentName` for a built-in agent. Names are non-empty literals.
pub(crate) fn builtin_agent_name(name: &'static str) -> AgentName {
    AgentName::new(name).unwrap_or_else(|| unreachable!("built-in agent names are non-empty"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pipeline::{ChatRole, Completion, ModelId, ToolCall};
    use std::sync::Mutex;

    /// Always asks for the same tool.
    struct Insistent {
        model: ModelId,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl LlmProvider for Insistent {
        fn model(&self) -> &ModelId {
            &self.model
        }

        async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError> {
            self.seen.lock().unwrap().push(request);
            Ok(Completion {
                tool_calls: vec![ToolCall {
                    id: "c".into(),
                    name: "get_current_date".into(),
                    arguments: serde_json::json!({}),
                }],
                usage: TokenUsage::new(3, 1),
                ..Completion::default()
            })
        }
    }

    #[tokio::test]
    async fn tool_rounds_are_bounded() {
        let provider = Arc::new(Insistent {
            model: ModelId::new("m").unwrap(),
            seen: Mutex::new(Vec::new()),
        });
        let agent = ChatAgent::new(AgentName::new("looper").unwrap(), "loop", provider.clone())
            .with_tools(ToolSet::new().with(crate::tools::GetCurrentDate::new()))
            .with_max_tool_rounds(2);

        let err = agent.run("what day is it").await.unwrap_err();
        assert!(matches!(err, AgentError::ToolRoundsExceeded { limit: 2, .. }));
        // Two tool rounds, then the third request is refused.
        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].messages[0].role, ChatRole::System);
        assert_eq!(seen[0].tools.len(), 1);
    }
}
