//! agentflow agents, tools, and workflow executors.
//!
//! This crate provides the tool-calling [`ChatAgent`], the content review
//! [`ContentWorkflow`] executor, the manager-led [`RoundTable`], the streaming
//! [`ChatSession`], and the demonstration tools and agents built on them.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Executors sequence calls between business logic
//! in the [`pipeline`] crate and the [`pipeline::LlmProvider`] port. Routing
//! and graph rules live in `pipeline`; nothing here decides where a draft
//! goes.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`agent`] | `ChatAgent` and its tool loop |
//! | [`tools`] | `ToolSet` and the demo tools |
//! | [`workflow`] | Content review executor |
//! | [`roundtable`] | Manager-led multi-agent collaboration |
//! | [`chat`] | Streaming chat session |
//! | [`prompts`] | Agent instructions |

use std::sync::Arc;

use pipeline::LlmProvider;

pub mod agent;
pub mod chat;
pub mod prompts;
pub mod roundtable;
pub mod tools;
pub mod workflow;

pub use agent::{AgentError, AgentResponse, ChatAgent, DEFAULT_MAX_TOOL_ROUNDS};
pub use chat::ChatSession;
pub use roundtable::{
    OrchestrationError, OrchestratorMessageKind, ProgressLedger, RoundTable, RoundTableEvent,
    RoundTableLimits, RoundTableOutcome, StopReason,
};
pub use tools::ToolSet;
pub use workflow::{ContentWorkflow, WorkflowOutcome};

use agent::builtin_agent_name;
use tools::{
    builtin_name, AgentTool, CheckFridge, FindRecipes, GetActivities, GetCurrentDate, GetWeather,
};

// ---------------------------------------------------------------------------
// Demo agents
// ---------------------------------------------------------------------------

/// Answers weather questions with `get_weather(city)`.
pub fn weather_agent(provider: Arc<dyn LlmProvider>) -> ChatAgent {
    ChatAgent::new(builtin_agent_name("weather_agent"), prompts::WEATHER_INFO, provider)
        .with_tools(ToolSet::new().with(GetWeather::new()))
}

/// Plans a weekend from the date, the forecast, and local activities.
pub fn weekend_agent(provider: Arc<dyn LlmProvider>) -> ChatAgent {
    ChatAgent::new(builtin_agent_name("weekend_agent"), prompts::WEEKEND_PLANNER, provider)
        .with_description("Plans weekend activities around the weather.")
        .with_tools(
            ToolSet::new()
                .with(GetWeather::with_date())
                .with(GetActivities::new())
                .with(GetCurrentDate::new()),
        )
}

/// Picks recipes against what is in the fridge.
pub fn meal_agent(provider: Arc<dyn LlmProvider>) -> ChatAgent {
    ChatAgent::new(builtin_agent_name("meal_agent"), prompts::MEAL_PLANNER, provider)
        .with_description("Plans meals from recipes and fridge contents.")
        .with_tools(ToolSet::new().with(FindRecipes::new()).with(CheckFridge::new()))
}

/// Delegates to the weekend and meal agents through `plan_weekend` and
/// `plan_meal`.
pub fn supervisor_agent(provider: Arc<dyn LlmProvider>) -> ChatAgent {
    let weekend = AgentTool::new(
        builtin_name("plan_weekend"),
        "Plan a weekend based on user query and return the final response.",
        weekend_agent(provider.clone()),
    );
    let meal = AgentTool::new(
        builtin_name("plan_meal"),
        "Plan a meal based on user query and return the final response.",
        meal_agent(provider.clone()),
    );
    ChatAgent::new(builtin_agent_name("supervisor_agent"), prompts::SUPERVISOR, provider)
        .with_tools(ToolSet::new().with(weekend).with(meal))
}

/// Travel-planning round table: local activities, language tips, and a
/// summarizer, coordinated by a manager on the same backend.
pub fn travel_round_table(provider: Arc<dyn LlmProvider>) -> RoundTable {
    let participant = |name: &'static str, description: &str, instructions: &str| {
        ChatAgent::new(builtin_agent_name(name), instructions, provider.clone())
            .with_description(description)
    };
    let manager = ChatAgent::new(
        builtin_agent_name("manager"),
        prompts::MANAGER_SYSTEM,
        provider.clone(),
    );
    RoundTable::new(
        manager,
        vec![
            participant(
                "local_agent",
                "A local assistant that can suggest local activities or places to visit.",
                prompts::LOCAL_GUIDE,
            ),
            participant(
                "language_agent",
                "A helpful assistant that can provide language tips for a given destination.",
                prompts::LANGUAGE_GUIDE,
            ),
            participant(
                "travel_summary_agent",
                "A helpful assistant that can summarize the travel plan.",
                prompts::TRAVEL_SUMMARY,
            ),
        ],
    )
}
