//! agentflow CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Load configuration**: `.env` (overriding the process environment),
//!    then the backend selection in [`llm::BackendConfig::from_env`].
//! 2. **Wire observability**: `tracing-subscriber` with a human or JSON layer,
//!    plus an OpenTelemetry OTLP exporter when one is configured.
//! 3. **Construct infrastructure**: one [`llm::OpenAiCompatibleProvider`]
//!    shared by every agent of the chosen demo.
//! 4. **Run the demo** selected by the subcommand.

mod demos;
mod observability;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use llm::{BackendConfig, OpenAiCompatibleProvider};
use pipeline::LlmProvider;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "agentflow", version, about = "Multi-agent LLM workflows over OpenAI-compatible backends")]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true, env = "AGENTFLOW_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Stream one answer to a single prompt.
    Chat {
        #[arg(long)]
        prompt: Option<String>,
    },
    /// Interactive chat that remembers earlier turns. Reads questions from stdin.
    History,
    /// Ask the weather agent a question.
    Weather {
        #[arg(long)]
        prompt: Option<String>,
    },
    /// Ask the weekend planner a question.
    Weekend {
        #[arg(long)]
        prompt: Option<String>,
    },
    /// Ask the supervisor, which delegates to the weekend and meal planners.
    Supervisor {
        #[arg(long)]
        prompt: Option<String>,
    },
    /// Plan a trip with a manager-led round table of agents.
    Roundtable {
        #[arg(long)]
        task: Option<String>,
        #[arg(long, default_value_t = 20)]
        max_rounds: u32,
        #[arg(long, default_value_t = 3)]
        max_stalls: u32,
        #[arg(long, default_value_t = 2)]
        max_resets: u32,
    },
    /// Run the content review workflow.
    Workflow {
        #[arg(long)]
        request: Option<String>,
        /// Print the outcome as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the environment may already be set.
    let dotenv = dotenvy::dotenv_override();
    let cli = Cli::parse();
    let _telemetry = observability::init(cli.log_json)?;
    if let Ok(path) = dotenv {
        info!(path = %path.display(), "loaded environment file");
    }

    let config = BackendConfig::from_env().context("invalid backend configuration")?;
    info!(host = %config.host, model = %config.model, base_url = %config.base_url, "backend selected");
    let provider: Arc<dyn LlmProvider> = Arc::new(
        OpenAiCompatibleProvider::new(&config).context("failed to build LLM client")?,
    );

    match cli.command {
        Command::Chat { prompt } => demos::chat(provider, prompt).await,
        Command::History => demos::history(provider).await,
        Command::Weather { prompt } => demos::weather(provider, prompt).await,
        Command::Weekend { prompt } => demos::weekend(provider, prompt).await,
        Command::Supervisor { prompt } => demos::supervisor(provider, prompt).await,
        Command::Roundtable {
            task,
            max_rounds,
            max_stalls,
            max_resets,
        } => {
            let limits = nodes::RoundTableLimits {
                max_round_count: max_rounds,
                max_stall_count: max_stalls,
                max_reset_count: max_resets,
            };
            demos::roundtable(provider, task, limits).await
        }
        Command::Workflow { request, json } => demos::workflow(provider, request, json).await,
    }
}
