//! Walks the workflow graph with canned node outputs and checks which path
//! each reviewer payload selects.

use pipeline::{next_node, ReviewRoute, RunId, WorkflowNode, WorkflowRun};

/// Walks from the start node, feeding `review` as the reviewer's output and a
/// placeholder for every other node. Returns the visited nodes.
fn walk(review: &str) -> WorkflowRun {
    let mut run = WorkflowRun::new(RunId::new_random());
    let mut node = Some(WorkflowNode::START);
    while let Some(current) = node {
        run.enter(current).unwrap();
        let output = match current {
            WorkflowNode::Reviewer => review,
            _ => "node output",
        };
        node = next_node(current, output).unwrap();
    }
    run
}

fn nodes(run: &WorkflowRun) -> Vec<WorkflowNode> {
    run.visits().iter().map(|v| v.node).collect()
}

#[test]
fn high_score_publishes_directly() {
    let review = r#"{"score":92,"feedback":"great","clarity":90,"completeness":90,"accuracy":95,"structure":90}"#;
    let run = walk(review);
    assert_eq!(
        nodes(&run),
        [
            WorkflowNode::Writer,
            WorkflowNode::Reviewer,
            WorkflowNode::Publisher,
            WorkflowNode::Summarizer,
        ]
    );
    assert_eq!(run.route(), Some(ReviewRoute::Publish));
}

#[test]
fn low_score_goes_through_the_editor() {
    let review = r#"{"score":65,"feedback":"needs examples","clarity":60,"completeness":55,"accuracy":80,"structure":70}"#;
    let run = walk(review);
    assert_eq!(
        nodes(&run),
        [
            WorkflowNode::Writer,
            WorkflowNode::Reviewer,
            WorkflowNode::Editor,
            WorkflowNode::Publisher,
            WorkflowNode::Summarizer,
        ]
    );
    assert_eq!(run.route(), Some(ReviewRoute::Edit));
}

#[test]
fn unparseable_review_is_treated_as_approved() {
    let run = walk("not json");
    assert!(!run.has_visited(WorkflowNode::Editor));
    assert!(run.has_visited(WorkflowNode::Publisher));
    assert_eq!(run.route(), Some(ReviewRoute::Publish));
}

#[test]
fn score_of_exactly_eighty_is_approved() {
    let review = r#"{"score":80,"feedback":"ok","clarity":80,"completeness":80,"accuracy":80,"structure":80}"#;
    assert_eq!(walk(review).route(), Some(ReviewRoute::Publish));
}

#[test]
fn every_run_visits_each_node_at_most_once_and_ends_at_the_terminal() {
    for review in ["not json", r#"{"score":10,"feedback":"","clarity":0,"completeness":0,"accuracy":0,"structure":0}"#] {
        let run = walk(review);
        let visited = nodes(&run);
        let mut deduped = visited.clone();
        deduped.dedup();
        assert_eq!(visited, deduped);
        assert_eq!(visited.first(), Some(&WorkflowNode::START));
        assert_eq!(visited.last(), Some(&WorkflowNode::TERMINAL));
    }
}
