//! Newtype domain identifiers.
//!
//! Every named concept in the workspace (agents, tools, models, runs) is a
//! distinct newtype wrapping a primitive, so an [`AgentName`] cannot be passed
//! where a [`ToolName`] is expected even though both are strings underneath.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single workflow or orchestration run.
///
/// Generated fresh for every run; recorded on tracing spans so all activity
/// from one run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a [`RunId`] from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: string-backed (configuration names)
// ---------------------------------------------------------------------------

string_id! {
    /// Name of an agent (e.g. `"Writer"`, `"local_agent"`).
    ///
    /// Used in logs, in orchestration transcripts, and by the round-table
    /// manager when it nominates the next speaker.
    AgentName
}

string_id! {
    /// Name of a tool exposed to an agent (e.g. `"get_weather"`).
    ///
    /// Must match the function name the model uses in its tool calls.
    ToolName
}

string_id! {
    /// Model or deployment identifier sent to the backend
    /// (e.g. `"openai/gpt-4o"`, `"llama3.1:latest"`).
    ModelId
}
