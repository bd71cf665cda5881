//! Fixed topology of the content review workflow.
//!
//! ```text
//! Writer ─► Reviewer ─┬─(approved)──────────────► Publisher ─► Summarizer
//!                     └─(needs editing)─► Editor ──┘
//! ```
//!
//! The graph is static data ([`EDGES`]); [`next_node`] walks it by
//! evaluating each outgoing edge's guard against the node's output.
//! [`WorkflowRun`] records which nodes ran so the terminal node can describe
//! the path taken.

use serde::{Deserialize, Serialize};

use crate::routing::{route_review, ReviewRoute};
use crate::{RunId, Timestamp, WorkflowError};

/// A node of the content review workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowNode {
    Writer,
    Reviewer,
    Editor,
    Publisher,
    Summarizer,
}

impl WorkflowNode {
    /// Unique start node.
    pub const START: WorkflowNode = WorkflowNode::Writer;

    /// Unique terminal node.
    pub const TERMINAL: WorkflowNode = WorkflowNode::Summarizer;

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Writer => "Writer",
            Self::Reviewer => "Reviewer",
            Self::Editor => "Editor",
            Self::Publisher => "Publisher",
            Self::Summarizer => "Summarizer",
        }
    }
}

impl std::fmt::Display for WorkflowNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Condition under which an edge may be taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeGuard {
    Always,
    /// The source node's output routes to [`ReviewRoute::Publish`].
    Approved,
    /// The source node's output routes to [`ReviewRoute::Edit`].
    NeedsEditing,
}

impl EdgeGuard {
    /// Evaluates the guard against the route decided for the source node's
    /// output. `route` is `None` when no guard of the node depends on it.
    pub fn admits(self, route: Option<ReviewRoute>) -> bool {
        match self {
            Self::Always => true,
            Self::Approved => route == Some(ReviewRoute::Publish),
            Self::NeedsEditing => route == Some(ReviewRoute::Edit),
        }
    }
}

/// A directed, guarded edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: WorkflowNode,
    pub to: WorkflowNode,
    pub guard: EdgeGuard,
}

/// Every edge of the workflow.
pub const EDGES: [Edge; 5] = [
    Edge {
        from: WorkflowNode::Writer,
        to: WorkflowNode::Reviewer,
        guard: EdgeGuard::Always,
    },
    Edge {
        from: WorkflowNode::Reviewer,
        to: WorkflowNode::Publisher,
        guard: EdgeGuard::Approved,
    },
    Edge {
        from: WorkflowNode::Reviewer,
        to: WorkflowNode::Editor,
        guard: EdgeGuard::NeedsEditing,
    },
    Edge {
        from: WorkflowNode::Editor,
        to: WorkflowNode::Publisher,
        guard: EdgeGuard::Always,
    },
    Edge {
        from: WorkflowNode::Publisher,
        to: WorkflowNode::Summarizer,
        guard: EdgeGuard::Always,
    },
];

/// Outgoing edges of `node`, in declaration order.
pub fn outgoing(node: WorkflowNode) -> impl Iterator<Item = &'static Edge> {
    EDGES.iter().filter(move |e| e.from == node)
}

/// Selects the successor of `node` given the output it produced.
///
/// Returns `Ok(None)` at the terminal node. Exactly one guard must admit the
/// output for every other node; anything else is a [`WorkflowError::Graph`].
pub fn next_node(node: WorkflowNode, output: &str) -> Result<Option<WorkflowNode>, WorkflowError> {
    if node == WorkflowNode::TERMINAL {
        return Ok(None);
    }

    // The output is routed at most once per node, however many guards read it.
    let route = outgoing(node)
        .any(|e| e.guard != EdgeGuard::Always)
        .then(|| route_review(output));
    let mut admitted = outgoing(node).filter(|e| e.guard.admits(route));
    let first = admitted.next();
    match (first, admitted.next()) {
        (Some(edge), None) => Ok(Some(edge.to)),
        (None, _) => Err(WorkflowError::Graph {
            message: format!("no outgoing edge of {node} admits its output"),
        }),
        (Some(a), Some(b)) => Err(WorkflowError::Graph {
            message: format!("both {} and {} admit the output of {node}", a.to, b.to),
        }),
    }
}

// ---------------------------------------------------------------------------
// Run history
// ---------------------------------------------------------------------------

/// One executed node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeVisit {
    pub node: WorkflowNode,
    pub started_at: Timestamp,
}

/// Linear history of one workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: RunId,
    visits: Vec<NodeVisit>,
}

impl WorkflowRun {
    pub fn new(id: RunId) -> Self {
        Self {
            id,
            visits: Vec::new(),
        }
    }

    /// Records entry into `node`. Each node may run at most once per run.
    pub fn enter(&mut self, node: WorkflowNode) -> Result<(), WorkflowError> {
        if self.has_visited(node) {
            return Err(WorkflowError::Graph {
                message: format!("{node} already ran in run {}", self.id),
            });
        }
        self.visits.push(NodeVisit {
            node,
            started_at: Timestamp::now(),
        });
        Ok(())
    }

    pub fn visits(&self) -> &[NodeVisit] {
        &self.visits
    }

    pub fn has_visited(&self, node: WorkflowNode) -> bool {
        self.visits.iter().any(|v| v.node == node)
    }

    /// The route the run took out of the reviewer, once it is known.
    pub fn route(&self) -> Option<ReviewRoute> {
        if self.has_visited(WorkflowNode::Editor) {
            Some(ReviewRoute::Edit)
        } else if self.has_visited(WorkflowNode::Publisher) {
            Some(ReviewRoute::Publish)
        } else {
            None
        }
    }

    /// Human-readable path, e.g. `"Writer → Reviewer → Publisher"`.
    pub fn path(&self) -> String {
        self.visits
            .iter()
            .map(|v| v.node.as_str())
            .collect::<Vec<_>>()
            .join(" → ")
    }

    /// Describes the path taken for the summarizer's report.
    pub fn describe(&self) -> String {
        match self.route() {
            Some(ReviewRoute::Publish) => format!(
                "Workflow path: direct approval ({}). The draft met the quality bar and was published without edits.",
                self.path()
            ),
            Some(ReviewRoute::Edit) => format!(
                "Workflow path: edited ({}). The draft scored below {} and was revised before publication.",
                self.path(),
                crate::routing::APPROVAL_THRESHOLD
            ),
            None => format!("Workflow path so far: {}", self.path()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_node_but_the_terminal_has_an_outgoing_edge() {
        for node in [
            WorkflowNode::Writer,
            WorkflowNode::Reviewer,
            WorkflowNode::Editor,
            WorkflowNode::Publisher,
        ] {
            assert!(outgoing(node).next().is_some(), "{node}");
        }
        assert!(outgoing(WorkflowNode::TERMINAL).next().is_none());
    }

    #[test]
    fn start_node_has_no_incoming_edges() {
        assert!(EDGES.iter().all(|e| e.to != WorkflowNode::START));
    }

    #[test]
    fn unconditional_edges_ignore_output() {
        assert_eq!(
            next_node(WorkflowNode::Writer, "anything").unwrap(),
            Some(WorkflowNode::Reviewer)
        );
        assert_eq!(
            next_node(WorkflowNode::Editor, "").unwrap(),
            Some(WorkflowNode::Publisher)
        );
        assert_eq!(
            next_node(WorkflowNode::Publisher, "# Title").unwrap(),
            Some(WorkflowNode::Summarizer)
        );
        assert_eq!(next_node(WorkflowNode::Summarizer, "done").unwrap(), None);
    }

    #[test]
    fn guards_read_the_precomputed_route() {
        assert!(EdgeGuard::Always.admits(None));
        assert!(!EdgeGuard::Approved.admits(None));
        assert!(!EdgeGuard::NeedsEditing.admits(None));
        assert!(EdgeGuard::Approved.admits(Some(ReviewRoute::Publish)));
        assert!(EdgeGuard::NeedsEditing.admits(Some(ReviewRoute::Edit)));
        assert!(!EdgeGuard::NeedsEditing.admits(Some(ReviewRoute::Publish)));
    }

    #[test]
    fn unparseable_review_is_routed_and_reported_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;
        use tracing_subscriber::layer::{Context, SubscriberExt};

        struct WarnCounter(Arc<AtomicUsize>);

        impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for WarnCounter {
            fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
                if *event.metadata().level() == tracing::Level::WARN {
                    self.0.fetch_add(1, Ordering::SeqCst);
                }
            }
        }

        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(warnings.clone()));
        let next = tracing::subscriber::with_default(subscriber, || {
            next_node(WorkflowNode::Reviewer, "not a verdict").unwrap()
        });

        assert_eq!(next, Some(WorkflowNode::Publisher));
        assert_eq!(warnings.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn revisiting_a_node_is_rejected() {
        let mut run = WorkflowRun::new(RunId::new_random());
        run.enter(WorkflowNode::Writer).unwrap();
        assert!(matches!(
            run.enter(WorkflowNode::Writer),
            Err(WorkflowError::Graph { .. })
        ));
    }

    #[test]
    fn route_is_derived_from_history() {
        let mut run = WorkflowRun::new(RunId::new_random());
        run.enter(WorkflowNode::Writer).unwrap();
        run.enter(WorkflowNode::Reviewer).unwrap();
        assert_eq!(run.route(), None);
        run.enter(WorkflowNode::Editor).unwrap();
        run.enter(WorkflowNode::Publisher).unwrap();
        assert_eq!(run.route(), Some(ReviewRoute::Edit));
        assert_eq!(run.path(), "Writer → Reviewer → Editor → Publisher");
        assert!(run.describe().contains("edited"));
    }
}
