//! Streaming chat with an optional running history.

use std::sync::Arc;

use pipeline::{
    ChatMessage, CompletionRequest, DeltaSink, LlmError, LlmProvider, TokenUsage,
};
use tracing::debug;

/// Sampling temperature used for chat turns.
pub const CHAT_TEMPERATURE: f32 = 0.7;

/// A system prompt plus the turns exchanged so far.
///
/// With history enabled every question and answer is kept and sent with the
/// next question. Without it each question is answered on its own.
pub struct ChatSession {
    provider: Arc<dyn LlmProvider>,
    system: String,
    history: Vec<ChatMessage>,
    keep_history: bool,
    usage: TokenUsage,
}

impl ChatSession {
    /// One-shot session: each question is sent alone after the system prompt.
    pub fn new(provider: Arc<dyn LlmProvider>, system: impl Into<String>) -> Self {
        Self {
            provider,
            system: system.into(),
            history: Vec::new(),
            keep_history: false,
            usage: TokenUsage::default(),
        }
    }

    /// Session that accumulates user and assistant turns.
    pub fn with_history(provider: Arc<dyn LlmProvider>, system: impl Into<String>) -> Self {
        Self {
            keep_history: true,
            ..Self::new(provider, system)
        }
    }

    /// Turns exchanged so far, oldest first. Excludes the system prompt.
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn usage(&self) -> TokenUsage {
        self.usage
    }

    /// Sends `question`, streaming answer fragments to `on_delta`, and returns
    /// the full answer. A failed turn leaves the history unchanged.
    pub async fn ask(
        &mut self,
        question: &str,
        on_delta: DeltaSink<'_>,
    ) -> Result<String, LlmError> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(ChatMessage::system(self.system.clone()));
        messages.extend(self.history.iter().cloned());
        messages.push(ChatMessage::user(question));
        debug!(messages = messages.len(), "sending chat turn");

        let request = CompletionRequest {
            temperature: Some(CHAT_TEMPERATURE),
            ..CompletionRequest::new(messages)
        };
        let completion = self.provider.complete_streaming(request, on_delta).await?;
        self.usage += completion.usage;

        let answer = completion.content.unwrap_or_default();
        if self.keep_history {
            self.history.push(ChatMessage::user(question));
            self.history.push(ChatMessage::assistant(answer.clone()));
        }
        Ok(answer)
    }
}
