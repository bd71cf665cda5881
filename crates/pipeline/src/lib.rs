//! Core domain for agentflow.
//!
//! This crate contains the review verdict and its routing rule, the fixed
//! content-review workflow graph, the shared value types, and the port traits
//! ([`LlmProvider`], [`Tool`]) that infrastructure crates implement.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; the `llm` crate defines *how* to reach a
//! model, and the `nodes` crate sequences calls through these ports.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`RunId`, `AgentName`, `ToolName`, `ModelId`) |
//! | [`types`] | Shared value types (`ReviewVerdict`, `Draft`, `TokenUsage`, etc.) |
//! | [`routing`] | Post-review routing decision |
//! | [`graph`] | Workflow topology and run history |
//! | [`llm`] | `LlmProvider` port, chat messages, `LlmError` |
//! | [`tools`] | `Tool` port, `ToolError` |
//! | [`errors`] | `WorkflowError` |

pub mod errors;
pub mod graph;
pub mod identifiers;
pub mod llm;
pub mod routing;
pub mod tools;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::WorkflowError;
pub use graph::{next_node, Edge, EdgeGuard, NodeVisit, WorkflowNode, WorkflowRun, EDGES};
pub use identifiers::{AgentName, ModelId, RunId, ToolName};
pub use llm::{
    ChatMessage, ChatRole, Completion, CompletionRequest, DeltaSink, LlmError, LlmProvider,
    ResponseFormat, ToolCall, ToolDefinition,
};
pub use routing::{
    is_approved, needs_editing, parse_verdict, route_review, route_verdict, ReviewRoute,
    APPROVAL_THRESHOLD, UNPARSEABLE_VERDICT_ROUTE,
};
pub use tools::{Tool, ToolError};
pub use types::{Draft, IngestedChunk, ReviewVerdict, Timestamp, TokenCount, TokenUsage};
