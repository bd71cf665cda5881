//! Top-level error type for workflow runs.
//!
//! [`WorkflowError`] covers conditions that abort a run of the content review
//! workflow. Component-level errors (LLM call failures, tool failures) are
//! defined beside their ports in [`crate::llm`] and [`crate::tools`].
//!
//! There is no retry policy: every error here is fatal to the current run and
//! nothing produced before the failure is published.

use thiserror::Error;

use crate::WorkflowNode;

/// Errors that abort a workflow run.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A node's backing call failed (transport error, timeout, HTTP error,
    /// tool-loop exhaustion).
    #[error("Node {node} failed: {source}")]
    NodeFailed {
        /// The node that was executing.
        node: WorkflowNode,
        /// Underlying cause.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The walk left the fixed topology: a node ran twice, or no single
    /// outgoing edge admitted a node's output.
    #[error("Workflow graph violation: {message}")]
    Graph {
        /// Description of the violation.
        message: String,
    },
}

impl WorkflowError {
    /// Wraps a node's failure.
    pub fn node_failed(
        node: WorkflowNode,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::NodeFailed {
            node,
            source: Box::new(source),
        }
    }

    /// The node that failed, if the error came from a node.
    pub fn failed_node(&self) -> Option<WorkflowNode> {
        match self {
            Self::NodeFailed { node, .. } => Some(*node),
            Self::Graph { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn node_failure_keeps_its_source() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "deadline elapsed");
        let err = WorkflowError::node_failed(WorkflowNode::Reviewer, io);
        assert_eq!(err.failed_node(), Some(WorkflowNode::Reviewer));
        assert!(err.to_string().contains("Reviewer"));
        assert!(err.source().unwrap().to_string().contains("deadline elapsed"));
    }
}
