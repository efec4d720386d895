//! Internal response envelopes
//!
//! The shapes handed to the caller-supplied reshape function. These mirror
//! what the host's own backend returns for each endpoint, so the reshape
//! layer can stay a thin adapter.

use serde::Serialize;
use serde_json::{Map, Value};

use super::nodes::ToolUse;
use super::tags::STOP_REASON_END_TURN;

fn is_false(v: &bool) -> bool {
    !*v
}

/// One streamed chunk of a chat response.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ChatChunk {
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub unknown_blob_names: Vec<String>,
    #[serde(skip_serializing_if = "is_false", default)]
    pub checkpoint_not_found: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub workspace_file_chunks: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub nodes: Vec<OutputNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<i32>,
}

impl ChatChunk {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), ..Self::default() }
    }

    /// The empty end-of-turn chunk emitted when there is nothing to send.
    pub fn end_of_turn() -> Self {
        Self {
            stop_reason: Some(STOP_REASON_END_TURN),
            ..Self::default()
        }
    }

    pub fn with_stop_reason(mut self, stop_reason: i32) -> Self {
        self.stop_reason = Some(stop_reason);
        self
    }

    pub fn with_nodes(mut self, nodes: Vec<OutputNode>) -> Self {
        self.nodes = nodes;
        self
    }
}

/// A response node bound for the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputNode {
    pub id: i64,
    #[serde(rename = "type")]
    pub tag: i64,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_use: Option<ToolUse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<ThinkingOut>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThinkingOut {
    pub summary: String,
}

impl OutputNode {
    pub fn content(id: i64, tag: i64, content: impl Into<String>) -> Self {
        Self {
            id,
            tag,
            content: content.into(),
            tool_use: None,
            thinking: None,
        }
    }

    pub fn tool_use(id: i64, tag: i64, tool_use: ToolUse) -> Self {
        Self {
            id,
            tag,
            content: String::new(),
            tool_use: Some(tool_use),
            thinking: None,
        }
    }
}

/// Non-streamed chat envelope (also wraps per-delta text on the endpoints
/// that stream through the chat surface).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatResult {
    pub text: String,
    pub nodes: Vec<OutputNode>,
}

impl ChatResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), nodes: Vec::new() }
    }
}

/// Completion envelope; carries the timeout the call was resolved with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionResult {
    pub text: String,
    pub timeout_ms: u64,
}

/// Bare-text envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextResult {
    pub text: String,
}

/// The single chunk yielded by a next-edit generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextEditGenerationChunk {
    pub path: String,
    pub blob_name: String,
    pub char_start: i64,
    pub char_end: i64,
    pub existing_code: String,
    pub suggested_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NextEditRange {
    pub start: i64,
    pub stop: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextEditItem {
    pub path: String,
    pub range: NextEditRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextEditDebugInfo {
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextEditLocation {
    pub item: NextEditItem,
    pub score: i32,
    pub debug_info: NextEditDebugInfo,
}

impl NextEditLocation {
    pub fn new(path: impl Into<String>, start: i64, stop: i64, source: &str) -> Self {
        Self {
            item: NextEditItem {
                path: path.into(),
                range: NextEditRange { start, stop },
            },
            score: 1,
            debug_info: NextEditDebugInfo { source: source.to_string() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextEditLocationResult {
    pub candidate_locations: Vec<NextEditLocation>,
}

/// One entry of the model listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub name: String,
}

impl ModelInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Locally synthesized model listing, used when the official list cannot
/// be fetched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetModelsResult {
    pub models: Vec<Value>,
    pub default_model: String,
    pub feature_flags: Map<String, Value>,
}
