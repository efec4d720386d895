//! Typed node unions for the chat protocol
//!
//! Nodes arrive as loosely-typed JSON discriminated by a numeric tag. They
//! normalize into two tagged unions -- one per tag space -- with an explicit
//! `Unknown` variant so unrecognized tags stay visible (and keep their raw
//! payload) instead of being silently defaulted. Normalization is total:
//! malformed input produces empty-field nodes or `Unknown`, never an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::loose::{array_of, count_of, pick, string_of, tag_of, truthy};
use super::tags::*;

/// A tool invocation requested by the assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ToolUse {
    pub tool_name: String,
    pub tool_use_id: String,
    pub input_json: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mcp_server_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mcp_tool_name: String,
}

impl ToolUse {
    fn from_loose(value: &Value) -> Self {
        Self {
            tool_name: string_of(pick(value, &["tool_name", "toolName"])),
            tool_use_id: string_of(pick(value, &["tool_use_id", "toolUseId"])),
            input_json: string_of(pick(value, &["input_json", "inputJson"])),
            mcp_server_name: string_of(pick(value, &["mcp_server_name", "mcpServerName"])),
            mcp_tool_name: string_of(pick(value, &["mcp_tool_name", "mcpToolName"])),
        }
    }
}

/// The result of a previously-requested tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ToolResultNode {
    pub tool_use_id: String,
    pub content: String,
    pub is_error: bool,
}

impl ToolResultNode {
    fn from_loose(value: &Value) -> Self {
        Self {
            tool_use_id: string_of(pick(value, &["tool_use_id", "toolUseId"])),
            content: string_of(pick(value, &["content"])),
            is_error: truthy(pick(value, &["is_error", "isError"])),
        }
    }
}

/// One past exchange carried inside a history-summary marker, rendered
/// verbatim into the provider-bound prompt.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExchangeSource {
    pub request_message: String,
    pub response_text: String,
    pub request_nodes: Vec<RequestNode>,
    pub response_nodes: Vec<ResponseNode>,
}

impl ExchangeSource {
    pub fn from_loose(value: &Value) -> Self {
        Self {
            request_message: string_of(pick(value, &["request_message", "requestMessage"])),
            response_text: string_of(pick(value, &["response_text", "responseText"])),
            request_nodes: array_of(pick(value, &["request_nodes", "requestNodes"]))
                .iter()
                .map(RequestNode::from_loose)
                .collect(),
            response_nodes: array_of(pick(value, &["response_nodes", "responseNodes"]))
                .iter()
                .map(ResponseNode::from_loose)
                .collect(),
        }
    }
}

/// The embedded summary marker: a message template with named placeholders
/// plus the data substituted into it during compaction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistorySummaryNode {
    pub message_template: String,
    pub summary_text: String,
    pub summarization_request_id: String,
    pub history_beginning_dropped_num_exchanges: i64,
    pub history_middle_abridged_text: String,
    pub history_end: Vec<ExchangeSource>,
}

impl HistorySummaryNode {
    fn from_loose(value: &Value) -> Self {
        Self {
            message_template: string_of(pick(value, &["message_template", "messageTemplate"])),
            summary_text: string_of(pick(value, &["summary_text", "summaryText"])),
            summarization_request_id: string_of(pick(
                value,
                &["summarization_request_id", "summarizationRequestId"],
            )),
            history_beginning_dropped_num_exchanges: count_of(pick(
                value,
                &[
                    "history_beginning_dropped_num_exchanges",
                    "historyBeginningDroppedNumExchanges",
                ],
            )),
            history_middle_abridged_text: string_of(pick(
                value,
                &["history_middle_abridged_text", "historyMiddleAbridgedText"],
            )),
            history_end: array_of(pick(value, &["history_end", "historyEnd"]))
                .iter()
                .map(ExchangeSource::from_loose)
                .collect(),
        }
    }
}

/// A node in the request tag space.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestNode {
    pub id: i64,
    pub kind: RequestNodeKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestNodeKind {
    Text { content: String },
    ToolResult(ToolResultNode),
    HistorySummary(HistorySummaryNode),
    Unknown { tag: i64, raw: Value },
}

impl RequestNode {
    /// Normalize a loose value. Tags that name a payload-bearing kind but
    /// arrive without their payload object stay `Unknown` so downstream
    /// filters see the tag without inventing an empty payload.
    pub fn from_loose(value: &Value) -> Self {
        let id = count_of(pick(value, &["id"]));
        let tag = tag_of(pick(value, &["type", "node_type", "nodeType"]));
        let kind = match tag {
            REQUEST_NODE_TEXT => RequestNodeKind::Text {
                content: string_of(
                    pick(value, &["text_node", "textNode"])
                        .and_then(|n| pick(n, &["content"])),
                ),
            },
            REQUEST_NODE_TOOL_RESULT => {
                match pick(value, &["tool_result_node", "toolResultNode"]) {
                    Some(payload) if !payload.is_null() => {
                        RequestNodeKind::ToolResult(ToolResultNode::from_loose(payload))
                    }
                    _ => RequestNodeKind::Unknown { tag, raw: value.clone() },
                }
            }
            REQUEST_NODE_HISTORY_SUMMARY => {
                match pick(value, &["history_summary_node", "historySummaryNode"]) {
                    Some(payload) if !payload.is_null() => {
                        RequestNodeKind::HistorySummary(HistorySummaryNode::from_loose(payload))
                    }
                    _ => RequestNodeKind::Unknown { tag, raw: value.clone() },
                }
            }
            _ => RequestNodeKind::Unknown { tag, raw: value.clone() },
        };
        Self { id, kind }
    }

    /// Synthetic text node, used when compaction replaces a summary marker.
    pub fn text(id: i64, content: impl Into<String>) -> Self {
        Self {
            id,
            kind: RequestNodeKind::Text { content: content.into() },
        }
    }

    /// The numeric wire tag, preserved even for unknown kinds.
    pub fn tag(&self) -> i64 {
        match &self.kind {
            RequestNodeKind::Text { .. } => REQUEST_NODE_TEXT,
            RequestNodeKind::ToolResult(_) => REQUEST_NODE_TOOL_RESULT,
            RequestNodeKind::HistorySummary(_) => REQUEST_NODE_HISTORY_SUMMARY,
            RequestNodeKind::Unknown { tag, .. } => *tag,
        }
    }

    pub fn is_history_summary(&self) -> bool {
        matches!(self.kind, RequestNodeKind::HistorySummary(_))
    }

    pub fn is_tool_result(&self) -> bool {
        matches!(self.kind, RequestNodeKind::ToolResult(_))
    }
}

/// A node in the response tag space.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseNode {
    pub id: i64,
    pub kind: ResponseNodeKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseNodeKind {
    /// An incremental text fragment.
    RawResponse { content: String },
    /// The final, complete assistant text; supersedes accumulated fragments.
    MainTextFinished { content: String },
    ToolUse(ToolUse),
    ToolUseStart(ToolUse),
    Thinking { summary: String },
    Unknown { tag: i64, raw: Value },
}

impl ResponseNode {
    pub fn from_loose(value: &Value) -> Self {
        let id = count_of(pick(value, &["id"]));
        let tag = tag_of(pick(value, &["type", "node_type", "nodeType"]));
        let kind = match tag {
            RESPONSE_NODE_RAW_RESPONSE => ResponseNodeKind::RawResponse {
                content: string_of(pick(value, &["content"])),
            },
            RESPONSE_NODE_MAIN_TEXT_FINISHED => ResponseNodeKind::MainTextFinished {
                content: string_of(pick(value, &["content"])),
            },
            RESPONSE_NODE_TOOL_USE => ResponseNodeKind::ToolUse(tool_use_payload(value)),
            RESPONSE_NODE_TOOL_USE_START => ResponseNodeKind::ToolUseStart(tool_use_payload(value)),
            RESPONSE_NODE_THINKING => ResponseNodeKind::Thinking {
                summary: string_of(
                    pick(value, &["thinking", "thinking_node", "thinkingNode"])
                        .and_then(|n| pick(n, &["summary"])),
                ),
            },
            _ => ResponseNodeKind::Unknown { tag, raw: value.clone() },
        };
        Self { id, kind }
    }

    pub fn tag(&self) -> i64 {
        match &self.kind {
            ResponseNodeKind::RawResponse { .. } => RESPONSE_NODE_RAW_RESPONSE,
            ResponseNodeKind::MainTextFinished { .. } => RESPONSE_NODE_MAIN_TEXT_FINISHED,
            ResponseNodeKind::ToolUse(_) => RESPONSE_NODE_TOOL_USE,
            ResponseNodeKind::ToolUseStart(_) => RESPONSE_NODE_TOOL_USE_START,
            ResponseNodeKind::Thinking { .. } => RESPONSE_NODE_THINKING,
            ResponseNodeKind::Unknown { tag, .. } => *tag,
        }
    }
}

/// A tool-use node without its payload still normalizes to the tool-use
/// kind with empty fields; every consumer filters on a non-empty name.
fn tool_use_payload(value: &Value) -> ToolUse {
    pick(value, &["tool_use", "toolUse"])
        .map(ToolUse::from_loose)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_node_reads_payload_content() {
        let node = RequestNode::from_loose(&json!({
            "id": 3, "type": 0, "textNode": {"content": "hi"}
        }));
        assert_eq!(node.id, 3);
        assert_eq!(node.kind, RequestNodeKind::Text { content: "hi".into() });
    }

    #[test]
    fn summary_tag_without_payload_stays_unknown() {
        let node = RequestNode::from_loose(&json!({"id": 1, "type": 10}));
        assert!(!node.is_history_summary());
        assert_eq!(node.tag(), REQUEST_NODE_HISTORY_SUMMARY);
    }

    #[test]
    fn unparseable_tag_is_sentinel() {
        let node = ResponseNode::from_loose(&json!({"type": "wat"}));
        assert_eq!(node.tag(), NODE_TAG_UNKNOWN);
    }

    #[test]
    fn camel_case_tool_use_aliases() {
        let node = ResponseNode::from_loose(&json!({
            "type": 5,
            "toolUse": {"toolName": "view", "toolUseId": "t1", "inputJson": "{}"}
        }));
        match node.kind {
            ResponseNodeKind::ToolUse(tu) => {
                assert_eq!(tu.tool_name, "view");
                assert_eq!(tu.tool_use_id, "t1");
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }
}
