//! One function per subcommand. Each prints its result to stdout.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use nodes::{
    prompts, ChatSession, ContentWorkflow, RoundTableEvent, RoundTableLimits, WorkflowOutcome,
};
use pipeline::LlmProvider;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

const WEATHER_PROMPT: &str = "how's weather today in sf?";
const WEEKEND_PROMPT: &str = "what can I do this weekend in San Francisco?";
const SUPERVISOR_PROMPT: &str = "my kids want pasta for dinner";
const ROUNDTABLE_TASK: &str = "Plan a half-day trip to Costa Rica";
const WORKFLOW_REQUEST: &str = "Write a short article about the benefits of code review.";

fn print_delta(delta: &str) {
    print!("{delta}");
    // Best effort; a closed stdout surfaces on the next println.
    let _ = std::io::stdout().flush();
}

pub async fn chat(provider: Arc<dyn LlmProvider>, prompt: Option<String>) -> anyhow::Result<()> {
    let prompt = prompt.unwrap_or_else(|| prompts::CAT_CHAT_REQUEST.to_string());
    let mut session = ChatSession::new(provider, prompts::CAT_CHAT);
    session
        .ask(&prompt, &mut |d: &str| print_delta(d))
        .await
        .context("chat request failed")?;
    println!();
    Ok(())
}

pub async fn history(provider: Arc<dyn LlmProvider>) -> anyhow::Result<()> {
    let mut session = ChatSession::with_history(provider, prompts::PLAIN_CHAT);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("\nYour question: ");
        std::io::stdout().flush()?;
        let Some(question) = lines.next_line().await? else {
            break;
        };
        let question = question.trim();
        if question.is_empty() {
            continue;
        }

        println!("\nAnswer: ");
        session
            .ask(question, &mut |d: &str| print_delta(d))
            .await
            .context("chat request failed")?;
        println!();
    }

    info!(turns = session.history().len() / 2, tokens = %session.usage().total(), "chat ended");
    Ok(())
}

pub async fn weather(provider: Arc<dyn LlmProvider>, prompt: Option<String>) -> anyhow::Result<()> {
    let agent = nodes::weather_agent(provider);
    let response = agent
        .run(prompt.as_deref().unwrap_or(WEATHER_PROMPT))
        .await?;
    println!("{}", response.text);
    Ok(())
}

pub async fn weekend(provider: Arc<dyn LlmProvider>, prompt: Option<String>) -> anyhow::Result<()> {
    let agent = nodes::weekend_agent(provider);
    let response = agent
        .run(prompt.as_deref().unwrap_or(WEEKEND_PROMPT))
        .await?;
    println!("{}", response.text);
    Ok(())
}

pub async fn supervisor(provider: Arc<dyn LlmProvider>, prompt: Option<String>) -> anyhow::Result<()> {
    let agent = nodes::supervisor_agent(provider);
    let response = agent
        .run(prompt.as_deref().unwrap_or(SUPERVISOR_PROMPT))
        .await?;
    println!("{}", response.text);
    Ok(())
}

pub async fn roundtable(
    provider: Arc<dyn LlmProvider>,
    task: Option<String>,
    limits: RoundTableLimits,
) -> anyhow::Result<()> {
    let table = nodes::travel_round_table(provider).with_limits(limits);
    let task = task.as_deref().unwrap_or(ROUNDTABLE_TASK);

    let outcome = table
        .run(task, &mut |event| match event {
            RoundTableEvent::Orchestrator { kind, text } => {
                println!("── orchestrator: {kind} ──\n{text}\n");
            }
            RoundTableEvent::Agent { agent, text } => {
                println!("── {agent} ──\n{text}\n");
            }
            RoundTableEvent::FinalAnswer { text } => {
                println!("── final travel plan ──\n{text}");
            }
        })
        .await?;

    info!(stop = %outcome.stop, rounds = outcome.rounds, resets = outcome.resets, "round table done");
    Ok(())
}

/// Serializable view of a finished workflow run.
#[derive(Debug, Serialize)]
struct WorkflowReport<'a> {
    run_id: String,
    path: String,
    route: pipeline::ReviewRoute,
    verdict: Option<&'a pipeline::ReviewVerdict>,
    published: &'a str,
    summary: &'a str,
    prompt_tokens: u64,
    completion_tokens: u64,
}

impl<'a> From<&'a WorkflowOutcome> for WorkflowReport<'a> {
    fn from(outcome: &'a WorkflowOutcome) -> Self {
        Self {
            run_id: outcome.run.id.to_string(),
            path: outcome.run.path(),
            route: outcome.route,
            verdict: outcome.verdict.as_ref(),
            published: &outcome.published,
            summary: &outcome.summary,
            prompt_tokens: outcome.usage.prompt.as_u64(),
            completion_tokens: outcome.usage.completion.as_u64(),
        }
    }
}

pub async fn workflow(
    provider: Arc<dyn LlmProvider>,
    request: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let outcome = ContentWorkflow::new(provider)
        .run(request.as_deref().unwrap_or(WORKFLOW_REQUEST))
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&WorkflowReport::from(&outcome))?);
        return Ok(());
    }

    println!("Path: {} ({})\n", outcome.run.path(), outcome.route);
    if let Some(verdict) = &outcome.verdict {
        println!("Review score: {} ({})\n", verdict.score, verdict.feedback);
    }
    println!("{}\n", outcome.published);
    println!("── publication report ──\n{}", outcome.summary);
    Ok(())
}
