//! In-memory providers for driving agents without a network.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use pipeline::{Completion, CompletionRequest, LlmError, LlmProvider, ModelId, TokenUsage, ToolCall};

/// Replays a fixed list of turns and records every request it receives.
pub struct ScriptedProvider {
    model: ModelId,
    script: Mutex<VecDeque<Result<Completion, LlmError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new(turns: impl IntoIterator<Item = Result<Completion, LlmError>>) -> Self {
        Self {
            model: ModelId::new("scripted").unwrap(),
            script: Mutex::new(turns.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Plain-text turns, each reporting 10 prompt and 5 completion tokens.
    pub fn texts<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(texts.into_iter().map(|t| Ok(text(t))))
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The last user message of every request, in order.
    pub fn user_inputs(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|r| r.messages.last().and_then(|m| m.content.clone()))
            .collect()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn model(&self) -> &ModelId {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError> {
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(LlmError::InvalidResponse {
                    message: "script exhausted".into(),
                })
            })
    }
}

pub fn text(content: &str) -> Completion {
    Completion {
        content: Some(content.to_string()),
        usage: TokenUsage::new(10, 5),
        ..Completion::default()
    }
}

pub fn tool_calls(calls: &[(&str, &str, serde_json::Value)]) -> Completion {
    Completion {
        tool_calls: calls
            .iter()
            .map(|(id, name, arguments)| ToolCall {
                id: id.to_string(),
                name: name.to_string(),
                arguments: arguments.clone(),
            })
            .collect(),
        usage: TokenUsage::new(10, 5),
        ..Completion::default()
    }
}
