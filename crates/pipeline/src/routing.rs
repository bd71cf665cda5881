//! Post-review routing decision.
//!
//! The reviewer's raw output decides whether a draft is published as-is or
//! sent to the editor first. The decision is a single [`ReviewRoute`] so the
//! two outgoing edges of the reviewer can never both fire or both stay silent.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ReviewVerdict;

/// Lowest overall score that is published without editing (inclusive).
pub const APPROVAL_THRESHOLD: i64 = 80;

/// Route taken when the reviewer's payload cannot be parsed as a verdict.
///
/// Fail-open: unparseable review data publishes the draft as-is. Editing
/// against feedback that does not exist is not meaningful. Do not invert.
pub const UNPARSEABLE_VERDICT_ROUTE: ReviewRoute = ReviewRoute::Publish;

/// Successor chosen for the reviewer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewRoute {
    /// Approved: go straight to the publisher.
    Publish,
    /// Below threshold: go through the editor, then the publisher.
    Edit,
}

impl std::fmt::Display for ReviewRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Publish => f.write_str("direct approval"),
            Self::Edit => f.write_str("edited"),
        }
    }
}

/// Parses the reviewer's payload into a verdict.
///
/// Returns `None` for anything that is not a complete verdict object:
/// malformed JSON, missing fields, or wrong field types. Scores written as
/// whole floats (`65.0`) or numeric strings (`"65"`) count as integers.
pub fn parse_verdict(payload: &str) -> Option<ReviewVerdict> {
    serde_json::from_str(payload).ok()
}

/// Routes an already-parsed verdict.
pub fn route_verdict(verdict: &ReviewVerdict) -> ReviewRoute {
    if verdict.score >= APPROVAL_THRESHOLD {
        ReviewRoute::Publish
    } else {
        ReviewRoute::Edit
    }
}

/// Routes the reviewer's raw payload. Never fails.
pub fn route_review(payload: &str) -> ReviewRoute {
    match parse_verdict(payload) {
        Some(verdict) => route_verdict(&verdict),
        None => {
            warn!(
                payload_len = payload.len(),
                "review payload is not a verdict; publishing without edits"
            );
            UNPARSEABLE_VERDICT_ROUTE
        }
    }
}

/// `true` iff the payload parses and scores below [`APPROVAL_THRESHOLD`].
pub fn needs_editing(payload: &str) -> bool {
    route_review(payload) == ReviewRoute::Edit
}

/// `true` iff the payload scores at or above [`APPROVAL_THRESHOLD`] or does
/// not parse at all.
pub fn is_approved(payload: &str) -> bool {
    route_review(payload) == ReviewRoute::Publish
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(score: i64) -> String {
        serde_json::json!({
            "score": score,
            "feedback": "tighten the intro",
            "clarity": 70,
            "completeness": 75,
            "accuracy": 90,
            "structure": 60
        })
        .to_string()
    }

    #[test]
    fn high_scores_are_approved() {
        for score in [80, 81, 92, 100] {
            let p = payload(score);
            assert!(is_approved(&p), "score {score}");
            assert!(!needs_editing(&p), "score {score}");
        }
    }

    #[test]
    fn low_scores_need_editing() {
        for score in [0, 1, 65, 79] {
            let p = payload(score);
            assert!(needs_editing(&p), "score {score}");
            assert!(!is_approved(&p), "score {score}");
        }
    }

    #[test]
    fn threshold_is_inclusive_on_the_approved_side() {
        assert_eq!(route_review(&payload(80)), ReviewRoute::Publish);
        assert_eq!(route_review(&payload(79)), ReviewRoute::Edit);
    }

    #[test]
    fn malformed_payloads_fail_open() {
        let cases = [
            "not json",
            "",
            "{}",
            "[]",
            "null",
            r#"{"score": 50}"#,
            r#"{"score": "fifty", "feedback": "", "clarity": 1, "completeness": 1, "accuracy": 1, "structure": 1}"#,
            r#"{"score": 50.5, "feedback": "", "clarity": 1, "completeness": 1, "accuracy": 1, "structure": 1}"#,
            "```json\n{\"score\": 10}\n```",
        ];
        for case in cases {
            assert!(is_approved(case), "{case:?}");
            assert!(!needs_editing(case), "{case:?}");
            assert_eq!(route_review(case), UNPARSEABLE_VERDICT_ROUTE);
        }
    }

    #[test]
    fn whole_float_and_string_scores_route_like_integers() {
        let with_score = |score: &str| {
            format!(
                r#"{{"score": {score}, "feedback": "cut the intro", "clarity": 70, "completeness": 75, "accuracy": 90, "structure": 60}}"#
            )
        };
        assert_eq!(route_review(&with_score("65.0")), ReviewRoute::Edit);
        assert_eq!(route_review(&with_score(r#""65""#)), ReviewRoute::Edit);
        assert_eq!(route_review(&with_score("80.0")), ReviewRoute::Publish);
        assert_eq!(route_review(&with_score(r#""92""#)), ReviewRoute::Publish);
        assert_eq!(route_review(&with_score("79.5")), UNPARSEABLE_VERDICT_ROUTE);
    }

    #[test]
    fn out_of_range_scores_are_accepted() {
        assert_eq!(route_review(&payload(150)), ReviewRoute::Publish);
        assert_eq!(route_review(&payload(-5)), ReviewRoute::Edit);
    }

    #[test]
    fn predicates_are_exclusive_and_exhaustive() {
        let mut cases: Vec<String> = (-10..=110).map(payload).collect();
        cases.extend(["garbage".to_string(), "{\"feedback\":\"x\"}".to_string()]);
        for case in &cases {
            assert_ne!(is_approved(case), needs_editing(case), "{case}");
        }
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        let p = format!("\n  {}  \n", payload(92));
        assert_eq!(parse_verdict(&p).map(|v| v.score), Some(92));
    }
}
