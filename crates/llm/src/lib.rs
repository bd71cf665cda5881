//! agentflow LLM provider infrastructure adapter.
//!
//! Implements the [`pipeline::LlmProvider`] trait for OpenAI-compatible
//! chat-completions endpoints. Backend selection (GitHub Models, Azure OpenAI,
//! Ollama, OpenAI) is resolved from the environment by [`BackendConfig`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** All HTTP transport, request formatting, response
//! parsing, and SSE stream decoding live here. The [`pipeline`] crate sees
//! only [`pipeline::LlmProvider`]. No retries or back-off are applied: a
//! failed call is returned to the caller as-is.

pub mod config;
pub mod openai;
mod stream;
mod wire;

pub use config::{ApiHost, BackendConfig, ConfigError, Credential};
pub use openai::OpenAiCompatibleProvider;
