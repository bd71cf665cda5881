//! Manager-led collaboration between several agents.
//!
//! A manager agent never answers the task itself. It first writes a task
//! ledger (facts and a plan), then each round fills in a [`ProgressLedger`]
//! that says whether the task is done and who should speak next. The chosen
//! participant sees the whole conversation plus the manager's instruction.
//!
//! Rounds that loop, make no progress, or produce an unusable ledger count
//! as stalls. Too many stalls in a row trigger a reset: the conversation is
//! cleared and the manager replans. The run ends with the manager's final
//! answer when the task is satisfied, the round limit is hit, or resets run
//! out.

use pipeline::{AgentName, ChatMessage, TokenUsage};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::agent::{AgentError, AgentResponse, ChatAgent};
use crate::prompts::{self, render};

/// Speaker label for the manager's own turns in the conversation.
const ORCHESTRATOR: &str = "orchestrator";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundTableLimits {
    pub max_round_count: u32,
    /// Stalls tolerated before a reset. A reset happens once the count
    /// exceeds this value.
    pub max_stall_count: u32,
    /// Resets tolerated before the run is wound up.
    pub max_reset_count: u32,
}

impl Default for RoundTableLimits {
    fn default() -> Self {
        Self {
            max_round_count: 20,
            max_stall_count: 3,
            max_reset_count: 2,
        }
    }
}

/// `{reason, answer}` pair of the progress ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerItem<T> {
    #[serde(default)]
    pub reason: String,
    pub answer: T,
}

/// The manager's per-round assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressLedger {
    pub is_request_satisfied: LedgerItem<bool>,
    pub is_in_loop: LedgerItem<bool>,
    pub is_progress_being_made: LedgerItem<bool>,
    pub next_speaker: LedgerItem<String>,
    pub instruction_or_question: LedgerItem<String>,
}

impl ProgressLedger {
    /// Extracts the ledger from the manager's reply. Text around the outermost
    /// JSON object (code fences, preambles) is ignored.
    pub fn parse(text: &str) -> Option<Self> {
        let start = text.find('{')?;
        let end = text.rfind('}')?;
        if end < start {
            return None;
        }
        serde_json::from_str(&text[start..=end]).ok()
    }

    fn is_stalling(&self) -> bool {
        self.is_in_loop.answer || !self.is_progress_being_made.answer
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorMessageKind {
    /// Facts and plan, written at the start and after every reset.
    TaskLedger,
    /// Instruction handed to the next speaker.
    Instruction,
    /// Stalls, resets, and other bookkeeping.
    Notice,
}

impl std::fmt::Display for OrchestratorMessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::TaskLedger => "task_ledger",
            Self::Instruction => "instruction",
            Self::Notice => "notice",
        })
    }
}

/// Progress reported to the caller while a round table runs.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundTableEvent {
    Orchestrator {
        kind: OrchestratorMessageKind,
        text: String,
    },
    Agent {
        agent: AgentName,
        text: String,
    },
    FinalAnswer {
        text: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Satisfied,
    RoundLimit,
    ResetLimit,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Satisfied => "request satisfied",
            Self::RoundLimit => "round limit reached",
            Self::ResetLimit => "reset limit reached",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundTableOutcome {
    pub answer: String,
    pub stop: StopReason,
    pub rounds: u32,
    pub resets: u32,
    pub usage: TokenUsage,
}

#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error("Round table has no participants")]
    NoParticipants,

    #[error("Round table manager failed: {0}")]
    Manager(#[source] AgentError),

    #[error("Participant {agent} failed: {source}")]
    Participant {
        agent: AgentName,
        #[source]
        source: AgentError,
    },
}

/// One entry of the shared conversation.
#[derive(Debug, Clone)]
struct Turn {
    speaker: String,
    text: String,
}

/// Facts and plan the manager works from.
#[derive(Debug, Clone)]
struct TaskLedger {
    facts: String,
    plan: String,
}

impl TaskLedger {
    fn render(&self) -> String {
        format!("Facts:\n\n{}\n\nPlan:\n\n{}", self.facts, self.plan)
    }
}

pub struct RoundTable {
    manager: ChatAgent,
    participants: Vec<ChatAgent>,
    limits: RoundTableLimits,
}

impl RoundTable {
    pub fn new(manager: ChatAgent, participants: Vec<ChatAgent>) -> Self {
        Self {
            manager,
            participants,
            limits: RoundTableLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: RoundTableLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn participants(&self) -> &[ChatAgent] {
        &self.participants
    }

    /// Works on `task` until the manager is satisfied or a limit is hit.
    pub async fn run(
        &self,
        task: &str,
        on_event: &mut (dyn FnMut(RoundTableEvent) + Send),
    ) -> Result<RoundTableOutcome, OrchestrationError> {
        if self.participants.is_empty() {
            return Err(OrchestrationError::NoParticipants);
        }
        let run = Session {
            table: self,
            task,
            usage: TokenUsage::default(),
        };
        run.drive(on_event)
            .instrument(info_span!("round_table", participants = self.participants.len()))
            .await
    }

    fn team(&self) -> String {
        self.participants
            .iter()
            .map(|p| format!("- {}: {}", p.name(), p.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn names(&self) -> String {
        self.participants
            .iter()
            .map(|p| p.name().as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn participant(&self, name: &str) -> Option<&ChatAgent> {
        let name = name.trim();
        self.participants.iter().find(|p| p.name().as_str() == name)
    }
}

/// State of one run.
struct Session<'a> {
    table: &'a RoundTable,
    task: &'a str,
    usage: TokenUsage,
}

impl Session<'_> {
    async fn drive(
        mut self,
        on_event: &mut (dyn FnMut(RoundTableEvent) + Send),
    ) -> Result<RoundTableOutcome, OrchestrationError> {
        let (table, task) = (self.table, self.task);
        let limits = table.limits;
        let mut ledger = self.plan().await?;
        on_event(RoundTableEvent::Orchestrator {
            kind: OrchestratorMessageKind::TaskLedger,
            text: ledger.render(),
        });

        let mut turns: Vec<Turn> = Vec::new();
        let mut rounds = 0;
        let mut stalls = 0;
        let mut resets = 0;

        let stop = loop {
            if rounds >= limits.max_round_count {
                info!(rounds, "round limit reached");
                break StopReason::RoundLimit;
            }
            rounds += 1;

            let prompt = render(
                prompts::MANAGER_LEDGER,
                &[
                    ("task", task),
                    ("team", &table.team()),
                    ("names", &table.names()),
                    ("facts", &ledger.facts),
                    ("plan", &ledger.plan),
                    ("conversation", &conversation(&turns)),
                ],
            );
            let reply = self.manager_turn(vec![ChatMessage::user(prompt)]).await?;

            let progress = ProgressLedger::parse(&reply);
            if progress.as_ref().is_some_and(|p| p.is_request_satisfied.answer) {
                info!(rounds, "request satisfied");
                break StopReason::Satisfied;
            }

            let next = progress.as_ref().and_then(|p| {
                table
                    .participant(&p.next_speaker.answer)
                    .map(|agent| (agent, p.instruction_or_question.answer.clone()))
            });
            let stalled = match &progress {
                None => {
                    warn!(rounds, "progress ledger could not be parsed");
                    true
                }
                Some(p) if next.is_none() => {
                    warn!(rounds, speaker = %p.next_speaker.answer, "manager picked an unknown speaker");
                    true
                }
                Some(p) => p.is_stalling(),
            };
            if stalled {
                stalls += 1;
            } else {
                stalls = u32::saturating_sub(stalls, 1);
            }
            debug!(rounds, stalls, resets, "progress assessed");

            if stalls > limits.max_stall_count {
                resets += 1;
                if resets > limits.max_reset_count {
                    warn!(resets, "reset limit reached");
                    break StopReason::ResetLimit;
                }
                warn!(stalls, resets, "stalled; resetting and replanning");
                on_event(RoundTableEvent::Orchestrator {
                    kind: OrchestratorMessageKind::Notice,
                    text: format!("No progress after {stalls} stalled rounds; replanning."),
                });
                ledger = self.replan(&ledger, &turns).await?;
                on_event(RoundTableEvent::Orchestrator {
                    kind: OrchestratorMessageKind::TaskLedger,
                    text: ledger.render(),
                });
                turns.clear();
                stalls = 0;
                continue;
            }

            let Some((agent, instruction)) = next else {
                continue;
            };
            on_event(RoundTableEvent::Orchestrator {
                kind: OrchestratorMessageKind::Instruction,
                text: format!("{}: {instruction}", agent.name()),
            });
            turns.push(Turn {
                speaker: ORCHESTRATOR.to_string(),
                text: instruction,
            });

            info!(rounds, agent = %agent.name(), "participant speaking");
            let response = agent
                .run_messages(participant_messages(task, &turns))
                .await
                .map_err(|source| OrchestrationError::Participant {
                    agent: agent.name().clone(),
                    source,
                })?;
            self.usage += response.usage;
            on_event(RoundTableEvent::Agent {
                agent: agent.name().clone(),
                text: response.text.clone(),
            });
            turns.push(Turn {
                speaker: agent.name().to_string(),
                text: response.text,
            });
        };

        let prompt = render(
            prompts::MANAGER_FINAL,
            &[("task", task), ("conversation", &conversation(&turns))],
        );
        let answer = self.manager_turn(vec![ChatMessage::user(prompt)]).await?;
        on_event(RoundTableEvent::FinalAnswer {
            text: answer.clone(),
        });
        info!(%stop, rounds, resets, tokens = %self.usage.total(), "round table finished");

        Ok(RoundTableOutcome {
            answer,
            stop,
            rounds,
            resets,
            usage: self.usage,
        })
    }

    /// Facts first, then a plan written with the facts in view.
    async fn plan(&mut self) -> Result<TaskLedger, OrchestrationError> {
        let facts_prompt = render(prompts::MANAGER_FACTS, &[("task", self.task)]);
        let plan_prompt = render(prompts::MANAGER_PLAN, &[("team", &self.table.team())]);
        let facts = self
            .manager_turn(vec![ChatMessage::user(facts_prompt.clone())])
            .await?;
        let plan = self
            .manager_turn(vec![
                ChatMessage::user(facts_prompt),
                ChatMessage::assistant(facts.clone()),
                ChatMessage::user(plan_prompt),
            ])
            .await?;
        Ok(TaskLedger { facts, plan })
    }

    async fn replan(
        &mut self,
        previous: &TaskLedger,
        turns: &[Turn],
    ) -> Result<TaskLedger, OrchestrationError> {
        let prompt = render(
            prompts::MANAGER_REPLAN,
            &[
                ("task", self.task),
                ("conversation", &conversation(turns)),
                ("team", &self.table.team()),
            ],
        );
        let plan = self.manager_turn(vec![ChatMessage::user(prompt)]).await?;
        Ok(TaskLedger {
            facts: previous.facts.clone(),
            plan,
        })
    }

    async fn manager_turn(&mut self, messages: Vec<ChatMessage>) -> Result<String, OrchestrationError> {
        let AgentResponse { text, usage, .. } = self
            .table
            .manager
            .run_messages(messages)
            .await
            .map_err(OrchestrationError::Manager)?;
        self.usage += usage;
        Ok(text)
    }
}

fn conversation(turns: &[Turn]) -> String {
    if turns.is_empty() {
        return "(no messages yet)".to_string();
    }
    turns
        .iter()
        .map(|t| format!("[{}]\n{}", t.speaker, t.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// What a participant sees: the task, then every turn so far. The last turn
/// is the manager's instruction to it.
fn participant_messages(task: &str, turns: &[Turn]) -> Vec<ChatMessage> {
    std::iter::once(ChatMessage::user(task))
        .chain(
            turns
                .iter()
                .map(|t| ChatMessage::user(format!("[{}]\n{}", t.speaker, t.text))),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(satisfied: bool, in_loop: bool, progress: bool, speaker: &str) -> String {
        serde_json::json!({
            "is_request_satisfied": { "reason": "r", "answer": satisfied },
            "is_in_loop": { "reason": "r", "answer": in_loop },
            "is_progress_being_made": { "reason": "r", "answer": progress },
            "next_speaker": { "reason": "r", "answer": speaker },
            "instruction_or_question": { "reason": "r", "answer": "go on" }
        })
        .to_string()
    }

    #[test]
    fn ledger_is_found_inside_code_fences() {
        let text = format!("Here you go:\n```json\n{}\n```", ledger(false, false, true, "a"));
        let parsed = ProgressLedger::parse(&text).unwrap();
        assert_eq!(parsed.next_speaker.answer, "a");
        assert!(!parsed.is_stalling());
    }

    #[test]
    fn ledger_without_an_object_is_rejected() {
        assert!(ProgressLedger::parse("no idea } {").is_none());
        assert!(ProgressLedger::parse("{\"is_in_loop\": true}").is_none());
    }

    #[test]
    fn looping_or_stagnant_ledgers_stall() {
        let looping = ProgressLedger::parse(&ledger(false, true, true, "a")).unwrap();
        let stagnant = ProgressLedger::parse(&ledger(false, false, false, "a")).unwrap();
        assert!(looping.is_stalling());
        assert!(stagnant.is_stalling());
    }

    #[test]
    fn participants_see_turns_in_order() {
        let turns = vec![
            Turn { speaker: ORCHESTRATOR.into(), text: "suggest places".into() },
            Turn { speaker: "local_agent".into(), text: "volcano".into() },
        ];
        let messages = participant_messages("trip", &turns);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content.as_deref(), Some("trip"));
        assert!(messages[2].content.as_deref().unwrap().starts_with("[local_agent]"));
    }
}
