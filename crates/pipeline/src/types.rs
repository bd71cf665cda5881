//! Shared value types for the agentflow domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! values that participate in domain decisions (review scores, drafts, token
//! accounting).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Token accounting
// ---------------------------------------------------------------------------

/// Number of tokens consumed in an LLM API call.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TokenCount(u64);

impl TokenCount {
    /// Creates a [`TokenCount`] from a raw integer.
    pub fn new(count: u64) -> Self {
        Self(count)
    }

    /// Returns the underlying integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns `true` if this count is zero.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for TokenCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Add for TokenCount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for TokenCount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

/// Prompt and completion token counts reported by a backend.
///
/// Backends that do not report usage (some local servers) yield zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the request (system prompt, history, tool definitions).
    pub prompt: TokenCount,
    /// Tokens generated by the model.
    pub completion: TokenCount,
}

impl TokenUsage {
    /// Creates a usage record from raw counts.
    pub fn new(prompt: u64, completion: u64) -> Self {
        Self {
            prompt: TokenCount::new(prompt),
            completion: TokenCount::new(completion),
        }
    }

    /// Sum of prompt and completion tokens.
    pub fn total(self) -> TokenCount {
        self.prompt + self.completion
    }
}

impl std::ops::AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.prompt += rhs.prompt;
        self.completion += rhs.completion;
    }
}

// ---------------------------------------------------------------------------
// Content review
// ---------------------------------------------------------------------------

/// Structured verdict emitted by the content reviewer.
///
/// All scores are nominally in `[0, 100]`. Out-of-range values are accepted
/// as-is; only `score` takes part in routing (see [`crate::routing`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewVerdict {
    /// Overall quality score.
    #[serde(deserialize_with = "lenient_score")]
    pub score: i64,
    /// Concise, actionable feedback for the editor.
    pub feedback: String,
    /// Is it easy to understand?
    #[serde(deserialize_with = "lenient_score")]
    pub clarity: i64,
    /// Does it fully address the topic?
    #[serde(deserialize_with = "lenient_score")]
    pub completeness: i64,
    /// Is the information correct?
    #[serde(deserialize_with = "lenient_score")]
    pub accuracy: i64,
    /// Is it well-organised?
    #[serde(deserialize_with = "lenient_score")]
    pub structure: i64,
}

/// Accepts an integer score written as `65`, `65.0`, or `"65"`.
///
/// Fractional values (`65.5`), booleans, and non-numeric strings are
/// rejected.
fn lenient_score<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawScore {
        Int(i64),
        Float(f64),
        Text(String),
    }

    let integral = |f: f64| {
        (f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64).then_some(f as i64)
    };
    let score = match RawScore::deserialize(deserializer)? {
        RawScore::Int(i) => Some(i),
        RawScore::Float(f) => integral(f),
        RawScore::Text(text) => text.trim().parse::<i64>().ok(),
    };
    score.ok_or_else(|| serde::de::Error::custom("score must be a whole number"))
}

impl ReviewVerdict {
    /// JSON schema handed to the backend as the reviewer's structured output
    /// format. Field set and types match the serde representation.
    pub fn json_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "score": { "type": "integer", "description": "Overall quality score (0-100)" },
                "feedback": { "type": "string", "description": "Concise, actionable feedback" },
                "clarity": { "type": "integer", "description": "Clarity score (0-100)" },
                "completeness": { "type": "integer", "description": "Completeness score (0-100)" },
                "accuracy": { "type": "integer", "description": "Accuracy score (0-100)" },
                "structure": { "type": "integer", "description": "Structure score (0-100)" }
            },
            "required": ["score", "feedback", "clarity", "completeness", "accuracy", "structure"],
            "additionalProperties": false
        })
    }
}

/// Text produced by the writer or editor and passed along one graph edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Draft(String);

impl Draft {
    /// Wraps generated text as a draft.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the draft text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the draft and returns its text.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Draft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Retrieval ingestion records
// ---------------------------------------------------------------------------

/// One entry of the ingestion output file: a JSON array of these objects.
///
/// `id` is `"{filename}-{n}"` with `n` starting at 1 for each source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestedChunk {
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
