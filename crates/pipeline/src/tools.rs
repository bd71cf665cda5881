//! Tool port.
//!
//! A [`Tool`] is a named function an agent exposes to the model. Tools take
//! and return JSON; the agent serialises results back into the conversation.

use async_trait::async_trait;
use thiserror::Error;

use crate::{ToolDefinition, ToolName};

/// Failures of a single tool invocation.
///
/// These are reported back to the model as tool results rather than aborting
/// the agent run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// The model called a tool the agent does not expose.
    #[error("Unknown tool: {name}")]
    Unknown { name: String },

    /// The arguments did not match the tool's parameter schema.
    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: ToolName, message: String },

    /// The tool ran and failed.
    #[error("Tool {tool} failed: {message}")]
    Failed { tool: ToolName, message: String },
}

/// A function callable by the model.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &ToolName;

    /// One-line description shown to the model.
    fn description(&self) -> &str;

    /// JSON schema of the arguments object.
    fn parameters(&self) -> serde_json::Value;

    /// Runs the tool.
    async fn call(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError>;

    /// Declaration sent to the backend.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().as_str().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}
