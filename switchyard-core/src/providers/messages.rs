//! Building provider-bound message lists
//!
//! Two surfaces: the full chat conversation (history plus the current turn,
//! flattened to the plain-text wire shape both provider families accept) and
//! the per-endpoint prompts for the one-shot and text-delta endpoints.

use serde_json::Value;

use crate::extract::extract_assistant_text;
use crate::prompt::build_system_prompt;
use crate::protocol::loose::{format_node_value, is_placeholder_message, pick, string_of};
use crate::protocol::nodes::{RequestNode, RequestNodeKind, ResponseNode};
use crate::protocol::request::{normalize_chat_request, ChatHistoryItem, ChatRequest};
use crate::router::Endpoint;

use super::adapter::WireMessage;

/// Flatten request nodes into user-visible text. Tool results are inlined
/// as tagged blocks so their content survives the plain-text shape; unknown
/// nodes render as `Node: <json>` lines. Falls back to the plain message
/// field when no node yields text.
fn user_text_from_nodes<'a>(
    nodes: impl Iterator<Item = &'a RequestNode>,
    fallback: &str,
) -> String {
    let mut parts: Vec<String> = Vec::new();
    for node in nodes {
        match &node.kind {
            RequestNodeKind::Text { content } => parts.push(content.clone()),
            RequestNodeKind::ToolResult(tr) => {
                let id = tr.tool_use_id.trim();
                if id.is_empty() {
                    continue;
                }
                parts.push(format!(
                    "<tool_result tool_use_id=\"{}\" is_error=\"{}\">\n{}\n</tool_result>",
                    id,
                    if tr.is_error { "true" } else { "false" },
                    tr.content.trim_end_matches('\n'),
                ));
            }
            // A summary marker surviving to this point has already been
            // folded into a text node by compaction; stray markers carry no
            // flat-text form.
            RequestNodeKind::HistorySummary(_) => {}
            RequestNodeKind::Unknown { raw, .. } => {
                let line = format_node_value("Node", raw);
                if !line.is_empty() {
                    parts.push(line);
                }
            }
        }
    }
    let joined = crate::history::render::normalize_joined_lines(parts.iter().map(String::as_str));
    if joined.trim().is_empty() {
        fallback.to_string()
    } else {
        joined
    }
}

fn assistant_text_for_item(item: &ChatHistoryItem) -> String {
    if !item.response_text.trim().is_empty() {
        return item.response_text.trim().to_string();
    }
    let nodes: Vec<ResponseNode> = item.merged_response_nodes().cloned().collect();
    extract_assistant_text(&nodes)
}

/// The conversation as alternating user/assistant turns plus the current
/// user message. Placeholder-only current messages (`---`) are dropped.
pub fn conversation_messages(req: &ChatRequest) -> Vec<WireMessage> {
    let mut out: Vec<WireMessage> = Vec::new();
    for item in &req.chat_history {
        let user = user_text_from_nodes(item.merged_request_nodes(), &item.request_message);
        if !user.trim().is_empty() {
            out.push(WireMessage::user(user));
        }
        let assistant = assistant_text_for_item(item);
        if !assistant.trim().is_empty() {
            out.push(WireMessage::assistant(assistant));
        }
    }

    let fallback = if is_placeholder_message(&req.message) {
        ""
    } else {
        req.message.as_str()
    };
    let current = user_text_from_nodes(req.current_request_nodes(), fallback);
    if !current.trim().is_empty() {
        out.push(WireMessage::user(current));
    }
    out
}

/// Chat messages for an OpenAI-compatible provider: the system prompt rides
/// as the leading message.
pub fn build_openai_chat_messages(req: &ChatRequest) -> Vec<WireMessage> {
    let system = build_system_prompt(req);
    let mut out = Vec::new();
    if !system.is_empty() {
        out.push(WireMessage::system(system));
    }
    out.extend(conversation_messages(req));
    out
}

/// Chat messages for an Anthropic provider: the system prompt is delivered
/// separately by the caller.
pub fn build_anthropic_chat_messages(req: &ChatRequest) -> Vec<WireMessage> {
    conversation_messages(req)
}

fn context_sentences(body: &Value) -> Vec<String> {
    let mut out = Vec::new();
    let lang = string_of(pick(body, &["lang", "language"]));
    if !lang.trim().is_empty() {
        out.push(format!("The user is working with {} code.", lang.trim()));
    }
    let path = string_of(pick(body, &["path"]));
    if !path.trim().is_empty() {
        out.push(format!("Current file path: {}", path.trim()));
    }
    out
}

fn system_with_context(base: &str, body: &Value) -> String {
    let mut parts = vec![base.to_string()];
    parts.extend(context_sentences(body));
    parts.join("\n\n")
}

fn body_message(body: &Value) -> String {
    string_of(pick(body, &["message", "prompt", "instruction"]))
}

fn body_selected_text(body: &Value) -> String {
    string_of(pick(
        body,
        &["selected_text", "selectedText", "selected_code", "selectedCode"],
    ))
}

/// Deterministic `(system, messages)` for each endpoint that places a
/// provider call from a bare body.
pub fn build_messages_for_endpoint(endpoint: &Endpoint, body: &Value) -> (String, Vec<WireMessage>) {
    match endpoint {
        Endpoint::Completion => {
            let system = system_with_context(
                "You are a code completion engine. Continue the code at the cursor marker and \
                 output only the inserted text, with no explanation and no markdown fences.",
                body,
            );
            let prefix = string_of(pick(body, &["prefix"]));
            let suffix = string_of(pick(body, &["suffix"]));
            let user = format!("{}<|cursor|>{}", prefix, suffix);
            (system, vec![WireMessage::user(user)])
        }
        Endpoint::ChatInputCompletion => {
            let system =
                "Complete the user's partially typed chat message. Output only the continuation."
                    .to_string();
            let typed = body_message(body);
            let typed = if typed.trim().is_empty() {
                string_of(pick(body, &["prefix"]))
            } else {
                typed
            };
            (system, vec![WireMessage::user(typed)])
        }
        Endpoint::Edit => {
            let system = system_with_context(
                "You are a code editing assistant. Apply the instruction to the selected code \
                 and output only the rewritten code.",
                body,
            );
            let user = format!(
                "Instruction:\n{}\n\nSelected code:\n{}",
                body_message(body),
                body_selected_text(body),
            );
            (system, vec![WireMessage::user(user)])
        }
        Endpoint::Chat => {
            let req = normalize_chat_request(body);
            (build_system_prompt(&req), conversation_messages(&req))
        }
        Endpoint::PromptEnhancer => {
            let system = "Rewrite the user's prompt to be clearer and more specific while \
                          preserving its intent. Output only the rewritten prompt."
                .to_string();
            (system, vec![WireMessage::user(body_message(body))])
        }
        Endpoint::GenerateConversationTitle => {
            let system = "Generate a short title of at most eight words for this conversation. \
                          Output only the title."
                .to_string();
            let mut text = body_message(body);
            if text.trim().is_empty() {
                let history = crate::protocol::loose::array_of(pick(
                    body,
                    &["chat_history", "chatHistory"],
                ));
                text = history
                    .iter()
                    .map(|h| string_of(pick(h, &["request_message", "requestMessage", "message"])))
                    .filter(|m| !m.trim().is_empty())
                    .collect::<Vec<_>>()
                    .join("\n");
            }
            (system, vec![WireMessage::user(text)])
        }
        Endpoint::InstructionStream => {
            let system = system_with_context(
                "Follow the instruction against the selected code and output only the result.",
                body,
            );
            let user = format!(
                "Instruction:\n{}\n\nSelected code:\n{}",
                body_message(body),
                body_selected_text(body),
            );
            (system, vec![WireMessage::user(user)])
        }
        Endpoint::SmartPasteStream => {
            let system = system_with_context(
                "Adapt the pasted text so it fits the destination context. Output only the \
                 adapted text.",
                body,
            );
            let pasted = string_of(pick(body, &["text", "pasted_text", "pastedText", "message"]));
            let prefix = string_of(pick(body, &["prefix"]));
            let suffix = string_of(pick(body, &["suffix"]));
            let user = format!(
                "Pasted text:\n{}\n\nDestination:\n{}<|cursor|>{}",
                pasted, prefix, suffix
            );
            (system, vec![WireMessage::user(user)])
        }
        Endpoint::GenerateCommitMessageStream => {
            let system = "Write a concise git commit message for the following diff. Output only \
                          the commit message."
                .to_string();
            let diff = string_of(pick(body, &["diff"]));
            let user = if diff.trim().is_empty() { body_message(body) } else { diff };
            (system, vec![WireMessage::user(user)])
        }
        Endpoint::NextEditStream => {
            let system = system_with_context(
                "Suggest the next edit for the selected region and output only the replacement \
                 text.",
                body,
            );
            let mut user = format!("Selected code:\n{}", body_selected_text(body));
            let instruction = body_message(body);
            if !instruction.trim().is_empty() {
                user.push_str("\n\nInstruction:\n");
                user.push_str(&instruction);
            }
            (system, vec![WireMessage::user(user)])
        }
        // The remaining endpoints never build provider messages.
        Endpoint::GetModels | Endpoint::NextEditLoc | Endpoint::ChatStream => {
            (String::new(), Vec::new())
        }
    }
}
