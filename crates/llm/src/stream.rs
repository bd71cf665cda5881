//! Server-sent-event decoding for streamed chat completions.
//!
//! The body arrives as arbitrary byte chunks. [`SseLineBuffer`] reassembles
//! lines, [`parse_sse_line`] picks out `data:` payloads, and
//! [`StreamAccumulator`] folds the JSON deltas into one [`Completion`].

use std::collections::BTreeMap;

use pipeline::{Completion, LlmError, ToolCall, TokenUsage};

use crate::wire::{parse_arguments, ChatCompletionChunk};

/// A meaningful SSE line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SseData {
    /// `data: {...}`: one JSON chunk.
    Chunk(String),
    /// `data: [DONE]`: end of stream.
    Done,
}

/// Interprets one SSE line. Comments, `event:`/`id:` fields and blank lines
/// yield `None`.
pub(crate) fn parse_sse_line(line: &str) -> Option<SseData> {
    let payload = line.strip_prefix("data:")?.trim();
    if payload.is_empty() {
        None
    } else if payload == "[DONE]" {
        Some(SseData::Done)
    } else {
        Some(SseData::Chunk(payload.to_string()))
    }
}

/// Splits a byte stream into lines, carrying partial lines across chunks.
#[derive(Debug, Default)]
pub(crate) struct SseLineBuffer {
    pending: Vec<u8>,
}

impl SseLineBuffer {
    /// Appends `bytes` and returns every line completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            lines.push(line.trim_end_matches(['\n', '\r']).to_string());
        }
        lines
    }

    /// Returns a trailing line that was not newline-terminated.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let raw = std::mem::take(&mut self.pending);
        Some(String::from_utf8_lossy(&raw).trim_end_matches('\r').to_string())
    }
}

#[derive(Debug, Default)]
struct PartialToolCall {
    id: String,
    name: String,
    arguments: String,
}

/// Folds streamed deltas into a complete turn.
#[derive(Debug, Default)]
pub(crate) struct StreamAccumulator {
    content: String,
    tool_calls: BTreeMap<usize, PartialToolCall>,
    usage: TokenUsage,
    finish_reason: Option<String>,
}

impl StreamAccumulator {
    /// Applies one JSON chunk; returns the text fragment it carried, if any.
    pub fn apply_json(&mut self, json: &str) -> Result<Option<String>, LlmError> {
        let chunk: ChatCompletionChunk =
            serde_json::from_str(json).map_err(|e| LlmError::InvalidResponse {
                message: format!("malformed stream chunk: {e}"),
            })?;
        Ok(self.apply(chunk))
    }

    fn apply(&mut self, chunk: ChatCompletionChunk) -> Option<String> {
        if let Some(usage) = chunk.usage {
            self.usage = usage.into();
        }

        let mut fragment: Option<String> = None;
        // Only the first choice is tracked; `n` is never set above 1.
        if let Some(choice) = chunk.choices.into_iter().next() {
            if let Some(reason) = choice.finish_reason {
                self.finish_reason = Some(reason);
            }
            for delta in choice.delta.tool_calls.unwrap_or_default() {
                let entry = self.tool_calls.entry(delta.index).or_default();
                if let Some(id) = delta.id {
                    entry.id = id;
                }
                if let Some(function) = delta.function {
                    if let Some(name) = function.name {
                        entry.name.push_str(&name);
                    }
                    if let Some(args) = function.arguments {
                        entry.arguments.push_str(&args);
                    }
                }
            }
            if let Some(text) = choice.delta.content.filter(|t| !t.is_empty()) {
                self.content.push_str(&text);
                fragment = Some(text);
            }
        }
        fragment
    }

    /// Produces the assembled turn.
    pub fn finish(self) -> Completion {
        Completion {
            content: (!self.content.is_empty()).then_some(self.content),
            tool_calls: self
                .tool_calls
                .into_values()
                .map(|p| ToolCall {
                    arguments: parse_arguments(&p.arguments),
                    id: p.id,
                    name: p.name,
                })
                .collect(),
            usage: self.usage,
            finish_reason: self.finish_reason,
        }
    }
}
