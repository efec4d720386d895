//! Normalized chat requests and history items
//!
//! Everything the host sends is normalized exactly once, up front, into
//! these shapes; nothing downstream ever touches the loose payload again.
//! History compaction runs as part of normalization, so a `ChatRequest` is
//! never observed partially normalized.

use serde_json::{Map, Value};

use crate::history::compact::compact_history;
use crate::tools::{normalize_tool_definitions, ToolDefinition};

use super::loose::{array_of, pick, record_of, string_of};
use super::nodes::{RequestNode, ResponseNode};

/// One past turn of the conversation.
///
/// The host has shipped three spellings for the request-node slot over the
/// years (`request_nodes`, `structured_request_nodes`, `nodes`); at most one
/// is authoritative per item, and consumers merge all three in that order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChatHistoryItem {
    pub request_id: String,
    pub request_message: String,
    pub response_text: String,
    pub request_nodes: Vec<RequestNode>,
    pub structured_request_nodes: Vec<RequestNode>,
    pub nodes: Vec<RequestNode>,
    pub response_nodes: Vec<ResponseNode>,
    pub structured_output_nodes: Vec<ResponseNode>,
}

impl ChatHistoryItem {
    pub fn from_loose(value: &Value) -> Self {
        Self {
            request_id: string_of(pick(value, &["request_id", "requestId", "requestID", "id"])),
            request_message: string_of(pick(value, &["request_message", "requestMessage", "message"])),
            response_text: string_of(pick(value, &["response_text", "responseText", "response", "text"])),
            request_nodes: request_nodes_of(pick(value, &["request_nodes", "requestNodes"])),
            structured_request_nodes: request_nodes_of(pick(
                value,
                &["structured_request_nodes", "structuredRequestNodes"],
            )),
            nodes: request_nodes_of(pick(value, &["nodes"])),
            response_nodes: response_nodes_of(pick(value, &["response_nodes", "responseNodes"])),
            structured_output_nodes: response_nodes_of(pick(
                value,
                &["structured_output_nodes", "structuredOutputNodes"],
            )),
        }
    }

    /// All request nodes in slot order.
    pub fn merged_request_nodes(&self) -> impl Iterator<Item = &RequestNode> {
        self.request_nodes
            .iter()
            .chain(&self.structured_request_nodes)
            .chain(&self.nodes)
    }

    /// All response nodes in slot order.
    pub fn merged_response_nodes(&self) -> impl Iterator<Item = &ResponseNode> {
        self.response_nodes.iter().chain(&self.structured_output_nodes)
    }
}

fn request_nodes_of(value: Option<&Value>) -> Vec<RequestNode> {
    array_of(value).iter().map(RequestNode::from_loose).collect()
}

fn response_nodes_of(value: Option<&Value>) -> Vec<ResponseNode> {
    array_of(value).iter().map(ResponseNode::from_loose).collect()
}

/// A fully normalized chat request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_id: String,
    /// Already compacted; starts at the most recent summary anchor.
    pub chat_history: Vec<ChatHistoryItem>,
    pub tool_definitions: Vec<ToolDefinition>,
    pub nodes: Vec<RequestNode>,
    pub structured_request_nodes: Vec<RequestNode>,
    pub request_nodes: Vec<RequestNode>,
    pub agent_memories: String,
    pub mode: String,
    pub prefix: String,
    pub suffix: String,
    pub lang: String,
    pub path: String,
    pub user_guidelines: String,
    pub workspace_guidelines: String,
    /// Rules arrive as a string or an array of strings; coerced at prompt
    /// assembly time.
    pub rules: Value,
    pub feature_detection_flags: Map<String, Value>,
}

impl ChatRequest {
    /// The chat-stream short-circuit test: nothing to say, nothing to send.
    pub fn is_empty_turn(&self) -> bool {
        self.message.trim().is_empty()
            && self.nodes.is_empty()
            && self.chat_history.is_empty()
            && self.structured_request_nodes.is_empty()
            && self.request_nodes.is_empty()
    }

    /// Current-turn request nodes in slot order.
    pub fn current_request_nodes(&self) -> impl Iterator<Item = &RequestNode> {
        self.nodes
            .iter()
            .chain(&self.structured_request_nodes)
            .chain(&self.request_nodes)
    }

    /// Whether the host understands separate tool-use-start events. Only a
    /// strict boolean `true` counts.
    pub fn supports_tool_use_start(&self) -> bool {
        self.feature_detection_flags.get("support_tool_use_start") == Some(&Value::Bool(true))
            || self.feature_detection_flags.get("supportToolUseStart") == Some(&Value::Bool(true))
    }
}

/// Normalize a loose request body. Never fails; malformed fields collapse
/// to their safe defaults. History compaction is applied here.
pub fn normalize_chat_request(body: &Value) -> ChatRequest {
    let chat_history = array_of(pick(body, &["chat_history", "chatHistory"]))
        .iter()
        .map(ChatHistoryItem::from_loose)
        .collect();
    let chat_history = compact_history(chat_history);

    let rules = pick(body, &["rules"]).cloned().unwrap_or(Value::Null);

    ChatRequest {
        message: string_of(pick(body, &["message", "prompt", "instruction"])),
        conversation_id: string_of(pick(
            body,
            &["conversation_id", "conversationId", "conversationID"],
        )),
        chat_history,
        tool_definitions: normalize_tool_definitions(
            pick(body, &["tool_definitions", "toolDefinitions"]).unwrap_or(&Value::Null),
        ),
        nodes: request_nodes_of(pick(body, &["nodes"])),
        structured_request_nodes: request_nodes_of(pick(
            body,
            &["structured_request_nodes", "structuredRequestNodes"],
        )),
        request_nodes: request_nodes_of(pick(body, &["request_nodes", "requestNodes"])),
        agent_memories: string_of(pick(body, &["agent_memories", "agentMemories"])),
        mode: string_of(pick(body, &["mode"])),
        prefix: string_of(pick(body, &["prefix"])),
        suffix: string_of(pick(body, &["suffix"])),
        lang: string_of(pick(body, &["lang", "language"])),
        path: string_of(pick(body, &["path"])),
        user_guidelines: string_of(pick(body, &["user_guidelines", "userGuidelines"])),
        workspace_guidelines: string_of(pick(
            body,
            &["workspace_guidelines", "workspaceGuidelines"],
        )),
        rules,
        feature_detection_flags: record_of(pick(
            body,
            &["feature_detection_flags", "featureDetectionFlags"],
        )),
    }
}
