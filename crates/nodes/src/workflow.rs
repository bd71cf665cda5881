//! Executor for the content review workflow.
//!
//! Each [`WorkflowNode`] is backed by one [`ChatAgent`]. The executor starts
//! at [`WorkflowNode::START`], runs the node's agent, asks [`next_node`] for
//! the successor, and stops after [`WorkflowNode::TERMINAL`]. Calls are
//! strictly sequential. Any node failure aborts the run; nothing downstream
//! of the failure executes.

use std::sync::Arc;

use pipeline::{
    next_node, parse_verdict, Draft, LlmProvider, ResponseFormat, ReviewRoute, ReviewVerdict,
    RunId, TokenUsage, WorkflowError, WorkflowNode, WorkflowRun,
};
use tracing::{info, info_span, Instrument};

use crate::agent::{builtin_agent_name, ChatAgent};
use crate::prompts;

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    pub run: WorkflowRun,
    /// Route taken out of the reviewer.
    pub route: ReviewRoute,
    /// The parsed review, if the reviewer produced a valid one.
    pub verdict: Option<ReviewVerdict>,
    /// The draft handed to the publisher: the writer's, or the editor's.
    pub final_draft: Draft,
    pub published: String,
    /// The summarizer's publication report.
    pub summary: String,
    pub usage: TokenUsage,
}

/// Writer → Reviewer → (Publisher | Editor → Publisher) → Summarizer.
#[derive(Debug, Clone)]
pub struct ContentWorkflow {
    writer: ChatAgent,
    reviewer: ChatAgent,
    editor: ChatAgent,
    publisher: ChatAgent,
    summarizer: ChatAgent,
}

/// Outputs gathered while walking the graph.
#[derive(Default)]
struct RunState {
    draft: Option<Draft>,
    review: Option<String>,
    verdict: Option<ReviewVerdict>,
    published: Option<String>,
    summary: Option<String>,
}

impl ContentWorkflow {
    /// Builds the five agents against one provider. The reviewer is asked for
    /// structured output matching [`ReviewVerdict`].
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        let agent = |node: WorkflowNode, instructions: &str| {
            ChatAgent::new(
                builtin_agent_name(node.as_str()),
                instructions,
                provider.clone(),
            )
        };
        Self {
            writer: agent(WorkflowNode::Writer, prompts::WRITER),
            reviewer: agent(WorkflowNode::Reviewer, prompts::REVIEWER).with_response_format(
                ResponseFormat::JsonSchema {
                    name: "ReviewResult".to_string(),
                    schema: ReviewVerdict::json_schema(),
                },
            ),
            editor: agent(WorkflowNode::Editor, prompts::EDITOR),
            publisher: agent(WorkflowNode::Publisher, prompts::PUBLISHER),
            summarizer: agent(WorkflowNode::Summarizer, prompts::SUMMARIZER),
        }
    }

    pub fn agent(&self, node: WorkflowNode) -> &ChatAgent {
        match node {
            WorkflowNode::Writer => &self.writer,
            WorkflowNode::Reviewer => &self.reviewer,
            WorkflowNode::Editor => &self.editor,
            WorkflowNode::Publisher => &self.publisher,
            WorkflowNode::Summarizer => &self.summarizer,
        }
    }

    /// Runs the workflow on a content request.
    pub async fn run(&self, request: &str) -> Result<WorkflowOutcome, WorkflowError> {
        let run_id = RunId::new_random();
        self.walk(run_id, request)
            .instrument(info_span!("content_workflow", run_id = %run_id))
            .await
    }

    async fn walk(&self, run_id: RunId, request: &str) -> Result<WorkflowOutcome, WorkflowError> {
        let mut run = WorkflowRun::new(run_id);
        let mut state = RunState::default();
        let mut usage = TokenUsage::default();
        let mut node = Some(WorkflowNode::START);

        while let Some(current) = node {
            run.enter(current)?;
            let input = node_input(current, request, &state, &run)?;
            info!(node = %current, "running node");

            let response = self
                .agent(current)
                .run(&input)
                .await
                .map_err(|e| WorkflowError::node_failed(current, e))?;
            usage += response.usage;

            node = next_node(current, &response.text)?;
            if let Some(next) = node {
                info!(from = %current, to = %next, "edge taken");
            }

            let output = response.text;
            match current {
                WorkflowNode::Writer | WorkflowNode::Editor => state.draft = Some(Draft::new(output)),
                WorkflowNode::Reviewer => {
                    state.verdict = parse_verdict(&output);
                    state.review = Some(output);
                }
                WorkflowNode::Publisher => state.published = Some(output),
                WorkflowNode::Summarizer => state.summary = Some(output),
            }
        }

        let route = run.route().ok_or_else(|| WorkflowError::Graph {
            message: "run finished without reaching the publisher".to_string(),
        })?;
        info!(path = %run.path(), %route, tokens = %usage.total(), "workflow complete");

        Ok(WorkflowOutcome {
            route,
            verdict: state.verdict,
            final_draft: required(state.draft, "draft")?,
            published: required(state.published, "published content")?,
            summary: required(state.summary, "summary")?,
            usage,
            run,
        })
    }
}

/// The message a node's agent receives.
fn node_input(
    node: WorkflowNode,
    request: &str,
    state: &RunState,
    run: &WorkflowRun,
) -> Result<String, WorkflowError> {
    let draft = || {
        state.draft.as_ref().ok_or_else(|| WorkflowError::Graph {
            message: format!("{node} ran before any draft was written"),
        })
    };

    Ok(match node {
        WorkflowNode::Writer => request.to_string(),
        WorkflowNode::Reviewer | WorkflowNode::Publisher => draft()?.as_str().to_string(),
        WorkflowNode::Editor => {
            let review = state.review.as_deref().unwrap_or_default();
            let feedback = state
                .verdict
                .as_ref()
                .map_or(review, |v| v.feedback.as_str());
            format!(
                "Content:\n\n{}\n\nReview feedback:\n\n{feedback}",
                draft()?.as_str()
            )
        }
        WorkflowNode::Summarizer => {
            let published = state.published.as_deref().ok_or_else(|| WorkflowError::Graph {
                message: "summarizer ran before publication".to_string(),
            })?;
            format!("{published}\n\n{}", run.describe())
        }
    })
}

fn required<T>(value: Option<T>, what: &str) -> Result<T, WorkflowError> {
    value.ok_or_else(|| WorkflowError::Graph {
        message: format!("run finished without a {what}"),
    })
}
