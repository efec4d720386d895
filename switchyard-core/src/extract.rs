//! Recovering assistant output from response node lists
//!
//! Streams accumulate `RawResponse` fragments and may be superseded by a
//! finalized `MainTextFinished` node; tool calls arrive either as full
//! tool-use nodes or, on providers that emit them, as tool-use-start nodes.

use crate::protocol::nodes::{ResponseNode, ResponseNodeKind};

/// A requested tool invocation recovered from output nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub id: String,
    pub name: String,
    /// Serialized JSON arguments; defaults to `"{}"` when absent.
    pub arguments: String,
}

/// The final assistant text: the last non-blank finished-text node wins;
/// otherwise all raw-response fragments concatenated in order.
pub fn extract_assistant_text(nodes: &[ResponseNode]) -> String {
    let mut finished = "";
    let mut raw = String::new();
    for node in nodes {
        match &node.kind {
            ResponseNodeKind::MainTextFinished { content } if !content.trim().is_empty() => {
                finished = content;
            }
            ResponseNodeKind::RawResponse { content } if !content.is_empty() => {
                raw.push_str(content);
            }
            _ => {}
        }
    }
    if finished.trim().is_empty() {
        raw.trim().to_string()
    } else {
        finished.trim().to_string()
    }
}

/// The requested tool invocations. The full tool-use set is authoritative;
/// tool-use-start nodes are consulted only when no full nodes exist.
/// Nameless entries are dropped, missing ids are synthesized as `tool-<n>`,
/// and duplicate ids are suppressed first-wins.
pub fn extract_tool_calls(nodes: &[ResponseNode]) -> Vec<ToolInvocation> {
    let full: Vec<_> = nodes
        .iter()
        .filter_map(|n| match &n.kind {
            ResponseNodeKind::ToolUse(tu) => Some(tu),
            _ => None,
        })
        .collect();
    let started: Vec<_> = nodes
        .iter()
        .filter_map(|n| match &n.kind {
            ResponseNodeKind::ToolUseStart(tu) => Some(tu),
            _ => None,
        })
        .collect();
    let chosen = if full.is_empty() { started } else { full };

    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for tu in chosen {
        let name = tu.tool_name.trim();
        if name.is_empty() {
            continue;
        }
        let id = match tu.tool_use_id.trim() {
            "" => format!("tool-{}", out.len() + 1),
            id => id.to_string(),
        };
        if !seen.insert(id.clone()) {
            continue;
        }
        let arguments = match tu.input_json.trim() {
            "" => "{}".to_string(),
            args => args.to_string(),
        };
        out.push(ToolInvocation {
            id,
            name: name.to_string(),
            arguments,
        });
    }
    out
}
