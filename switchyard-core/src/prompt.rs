//! System prompt assembly
//!
//! Fragments concatenate in a fixed order; provider prompt quality depends
//! on that order, so it is part of the contract. Each fragment is included
//! only when non-empty after trimming, and fragments are joined with a
//! blank line.

use serde_json::Value;

use crate::protocol::request::ChatRequest;

const AGENT_MODE_SENTENCE: &str =
    "You are an AI coding assistant with access to tools. Use tools when needed to complete tasks.";

/// Rules arrive as a string or an array. Array values are trimmed,
/// falsy-filtered and newline-joined; scalar values are stringified.
pub fn coerce_rules_text(rules: &Value) -> String {
    match rules {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Deterministic, order-stable system prompt: prefix, user guidelines,
/// workspace guidelines, rules, memories, agent-mode sentence, language,
/// current file path, suffix block.
pub fn build_system_prompt(req: &ChatRequest) -> String {
    let mut parts: Vec<String> = Vec::new();

    if !req.prefix.trim().is_empty() {
        parts.push(req.prefix.trim().to_string());
    }
    if !req.user_guidelines.trim().is_empty() {
        parts.push(req.user_guidelines.trim().to_string());
    }
    if !req.workspace_guidelines.trim().is_empty() {
        parts.push(req.workspace_guidelines.trim().to_string());
    }
    let rules_text = coerce_rules_text(&req.rules);
    if !rules_text.is_empty() {
        parts.push(rules_text);
    }
    if !req.agent_memories.trim().is_empty() {
        parts.push(req.agent_memories.trim().to_string());
    }
    if req.mode.trim().eq_ignore_ascii_case("AGENT") {
        parts.push(AGENT_MODE_SENTENCE.to_string());
    }
    if !req.lang.trim().is_empty() {
        parts.push(format!("The user is working with {} code.", req.lang.trim()));
    }
    if !req.path.trim().is_empty() {
        parts.push(format!("Current file path: {}", req.path.trim()));
    }
    if !req.suffix.trim().is_empty() {
        parts.push(format!("Suffix:\n{}", req.suffix).trim().to_string());
    }

    parts.join("\n\n").trim().to_string()
}
