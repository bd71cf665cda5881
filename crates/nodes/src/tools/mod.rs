//! Tool registry and the demonstration tools.
//!
//! | Module | Tools |
//! |--------|-------|
//! | [`weekend`] | `get_weather`, `get_activities`, `get_current_date` |
//! | [`meals`] | `find_recipes`, `check_fridge` |
//! | [`delegate`] | an agent exposed as a tool (`plan_weekend`, `plan_meal`) |

use std::collections::BTreeMap;
use std::sync::Arc;

use pipeline::{Tool, ToolCall, ToolDefinition, ToolError, ToolName};
use tracing::{info, warn};

pub mod delegate;
pub mod meals;
pub mod weekend;

pub use delegate::AgentTool;
pub use meals::{CheckFridge, FindRecipes};
pub use weekend::{GetActivities, GetCurrentDate, GetWeather};

/// Source of uniform samples in `[0, 1)`. Injected so tests can pin the
/// outcome of the randomised demo tools.
pub type Sampler = Arc<dyn Fn() -> f64 + Send + Sync>;

pub(crate) fn thread_rng_sampler() -> Sampler {
    Arc::new(rand::random::<f64>)
}

/// The tools one agent exposes, keyed by name.
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.tools.keys()).finish()
    }
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `tool`, replacing any tool with the same name.
    pub fn with(mut self, tool: impl Tool + 'static) -> Self {
        self.insert(Arc::new(tool));
        self
    }

    pub fn insert(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().as_str().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Declarations sent to the backend, in name order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Runs one call requested by the model.
    pub async fn call(&self, call: &ToolCall) -> Result<serde_json::Value, ToolError> {
        let tool = self.get(&call.name).ok_or_else(|| ToolError::Unknown {
            name: call.name.clone(),
        })?;
        info!(tool = %call.name, call_id = %call.id, "calling tool");
        tool.call(call.arguments.clone()).await
    }

    /// Runs one call and renders the outcome as the tool message content.
    ///
    /// Failures become `{"error": "..."}` so the model can react to them.
    pub async fn invoke(&self, call: &ToolCall) -> String {
        match self.call(call).await {
            Ok(serde_json::Value::String(text)) => text,
            Ok(value) => value.to_string(),
            Err(e) => {
                warn!(tool = %call.name, error = %e, "tool call failed");
                serde_json::json!({ "error": e.to_string() }).to_string()
            }
        }
    }
}

/// Reads a required string argument.
pub(crate) fn string_arg(
    tool: &ToolName,
    arguments: &serde_json::Value,
    key: &str,
) -> Result<String, ToolError> {
    arguments
        .get(key)
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ToolError::InvalidArguments {
            tool: tool.clone(),
            message: format!("missing string argument '{key}'"),
        })
}

/// Builds a `ToolName` for a built-in tool. Names are non-empty literals.
pub(crate) fn builtin_name(name: &'static str) -> ToolName {
    ToolName::new(name).unwrap_or_else(|| unreachable!("built-in tool names are non-empty"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(name: &str, arguments: serde_json::Value) -> ToolCall {
        ToolCall {
            id: "call_1".into(),
            name: name.into(),
            arguments,
        }
    }

    #[tokio::test]
    async fn unknown_tools_are_reported_as_errors() {
        let tools = ToolSet::new().with(GetCurrentDate::new());
        let out = tools.invoke(&call("launch_rockets", json!({}))).await;
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(parsed["error"].as_str().unwrap().contains("launch_rockets"));
    }

    #[tokio::test]
    async fn invalid_arguments_are_reported_as_errors() {
        let tools = ToolSet::new().with(GetActivities::new());
        let out = tools.invoke(&call("get_activities", json!({"city": 7}))).await;
        assert!(out.contains("error"));
        assert!(out.contains("city"));
    }

    #[test]
    fn definitions_are_sorted_by_name() {
        let tools = ToolSet::new()
            .with(GetWeather::new())
            .with(GetActivities::new())
            .with(GetCurrentDate::new());
        let names: Vec<String> = tools.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, ["get_activities", "get_current_date", "get_weather"]);
        assert_eq!(tools.len(), 3);
    }
}
