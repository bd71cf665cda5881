//! OpenAI-compatible chat-completions provider (`{base}/chat/completions`).
//!
//! Serves every supported backend: GitHub Models, Azure OpenAI's v1 surface,
//! Ollama, and OpenAI itself differ only in base URL, credential header, and
//! model name, all of which come from [`BackendConfig`].

use async_trait::async_trait;
use futures_util::StreamExt;
use pipeline::{Completion, CompletionRequest, DeltaSink, LlmError, LlmProvider, ModelId};
use reqwest::{Client, RequestBuilder};
use tracing::{debug, error, trace};

use crate::config::{BackendConfig, Credential};
use crate::stream::{parse_sse_line, SseData, SseLineBuffer, StreamAccumulator};
use crate::wire::{ChatCompletionRequest, ChatCompletionResponse, ErrorEnvelope};

/// Adapter for any endpoint implementing the chat-completions API.
///
/// Cheap to clone: `reqwest::Client` is an `Arc` internally.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    client: Client,
    url: String,
    model: ModelId,
    credential: Credential,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: &BackendConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Transport {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            url: config.chat_completions_url(),
            model: config.model.clone(),
            credential: config.credential.clone(),
        })
    }

    fn post(&self, payload: &ChatCompletionRequest<'_>) -> RequestBuilder {
        let req = self.client.post(&self.url).json(payload);
        match &self.credential {
            Credential::None => req,
            Credential::Bearer(token) => req.bearer_auth(token),
            Credential::ApiKeyHeader(key) => req.header("api-key", key),
        }
    }

    async fn send(&self, payload: &ChatCompletionRequest<'_>) -> Result<reqwest::Response, LlmError> {
        debug!(
            url = %self.url,
            model = %self.model,
            messages = payload.messages.len(),
            tools = payload.tools.len(),
            stream = payload.stream,
            "sending chat completion request"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full chat completion payload");
        }

        let response = self.post(payload).send().await.map_err(|e| {
            error!(url = %self.url, error = %e, "chat completion request failed (transport)");
            map_reqwest_error(e)
        })?;
        check_status(response).await
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn model(&self) -> &ModelId {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError> {
        let payload = ChatCompletionRequest::new(self.model.as_str(), request, false);
        let response = self.send(&payload).await?;

        let parsed = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| {
                error!(error = %e, "failed to deserialize chat completion response");
                LlmError::InvalidResponse {
                    message: format!("failed to parse response body: {e}"),
                }
            })?;

        let completion = parsed.into_completion()?;
        debug!(
            tool_calls = completion.tool_calls.len(),
            prompt_tokens = completion.usage.prompt.as_u64(),
            completion_tokens = completion.usage.completion.as_u64(),
            "received chat completion"
        );
        Ok(completion)
    }

    async fn complete_streaming(
        &self,
        request: CompletionRequest,
        on_delta: DeltaSink<'_>,
    ) -> Result<Completion, LlmError> {
        let payload = ChatCompletionRequest::new(self.model.as_str(), request, true);
        let response = self.send(&payload).await?;

        let mut body = response.bytes_stream();
        let mut lines = SseLineBuffer::default();
        let mut acc = StreamAccumulator::default();

        'body: while let Some(bytes) = body.next().await {
            let bytes = bytes.map_err(map_reqwest_error)?;
            for line in lines.push(&bytes) {
                match parse_sse_line(&line) {
                    Some(SseData::Done) => break 'body,
                    Some(SseData::Chunk(json)) => {
                        if let Some(fragment) = acc.apply_json(&json)? {
                            on_delta(&fragment);
                        }
                    }
                    None => {}
                }
            }
        }
        if let Some(SseData::Chunk(json)) = lines.finish().as_deref().and_then(parse_sse_line) {
            if let Some(fragment) = acc.apply_json(&json)? {
                on_delta(&fragment);
            }
        }

        let completion = acc.finish();
        debug!(
            tool_calls = completion.tool_calls.len(),
            content_len = completion.content.as_ref().map_or(0, String::len),
            "stream complete"
        );
        Ok(completion)
    }
}

fn map_reqwest_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Transport {
            message: e.to_string(),
        }
    }
}

/// Returns the response if successful, or a structured error.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());
    let message = error_message(&body);

    error!(%status, %message, "chat completion returned HTTP error");
    Err(LlmError::Http {
        status: status.as_u16(),
        message,
    })
}

/// Extracts the message from an OpenAI error envelope, or returns the raw body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => {
            let code = env
                .error
                .code
                .map(|v| match v {
                    serde_json::Value::String(s) => format!(" [code={s}]"),
                    other => format!(" [code={other}]"),
                })
                .unwrap_or_default();
            format!("{}{code}", env.error.message)
        }
        Err(_) => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::config::ApiHost;

    #[test]
    fn error_envelopes_are_unwrapped() {
        let body = r#"{"error":{"message":"Bad credentials","code":"unauthorized"}}"#;
        assert_eq!(error_message(body), "Bad credentials [code=unauthorized]");
        let body = r#"{"error":{"message":"Rate limit","code":429}}"#;
        assert_eq!(error_message(body), "Rate limit [code=429]");
        assert_eq!(error_message("upstream exploded"), "upstream exploded");
    }

    #[test]
    fn provider_targets_the_configured_endpoint() {
        let config = BackendConfig {
            host: ApiHost::Ollama,
            base_url: "http://localhost:11434/v1".into(),
            model: ModelId::new("llama3.1:latest").unwrap(),
            credential: Credential::None,
            timeout: Duration::from_secs(5),
        };
        let provider = OpenAiCompatibleProvider::new(&config).unwrap();
        assert_eq!(provider.url, "http://localhost:11434/v1/chat/completions");
        assert_eq!(provider.model().as_str(), "llama3.1:latest");
    }
}
