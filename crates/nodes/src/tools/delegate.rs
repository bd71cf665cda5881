//! Exposes an agent to another agent as a tool.

use async_trait::async_trait;
use pipeline::{Tool, ToolError, ToolName};
use serde_json::{json, Value};
use tracing::info;

use super::string_arg;
use crate::agent::ChatAgent;

/// Runs `agent` on the `query` argument and returns its final text.
pub struct AgentTool {
    name: ToolName,
    description: String,
    agent: ChatAgent,
}

impl AgentTool {
    pub fn new(name: ToolName, description: impl Into<String>, agent: ChatAgent) -> Self {
        Self {
            name,
            description: description.into(),
            agent,
        }
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn name(&self) -> &ToolName {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "The request for the specialist agent." }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, arguments: Value) -> Result<Value, ToolError> {
        let query = string_arg(&self.name, &arguments, "query")?;
        info!(tool = %self.name, agent = %self.agent.name(), "delegating to agent");
        let response = self.agent.run(&query).await.map_err(|e| ToolError::Failed {
            tool: self.name.clone(),
            message: e.to_string(),
        })?;
        Ok(Value::String(response.text))
    }
}
