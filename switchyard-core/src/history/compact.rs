//! History compaction around embedded summary markers
//!
//! The most recent history item carrying a resolvable summary marker is the
//! anchor: everything before it is dropped, and the marker itself is
//! replaced by a single text node carrying the rendered summary. Compaction
//! is a pure function over the history sequence; the caller decides what to
//! do with the returned value.

use crate::protocol::nodes::{RequestNode, RequestNodeKind};
use crate::protocol::request::ChatHistoryItem;
use crate::protocol::tags::{REQUEST_NODE_HISTORY_SUMMARY, REQUEST_NODE_TOOL_RESULT};

use super::render::render_history_summary;

fn item_has_summary(item: &ChatHistoryItem) -> bool {
    item.request_nodes
        .iter()
        .chain(&item.structured_request_nodes)
        .chain(&item.nodes)
        .any(RequestNode::is_history_summary)
}

/// Truncate a history to start at the most recent summary anchor and fold
/// the anchor's marker into rendered text. A history without an anchor is
/// returned unchanged.
pub fn compact_history(history: Vec<ChatHistoryItem>) -> Vec<ChatHistoryItem> {
    if history.is_empty() {
        return history;
    }

    let Some(anchor) = history.iter().rposition(item_has_summary) else {
        return history;
    };

    let mut history = history;
    let mut remaining = history.split_off(anchor);
    let first = &mut remaining[0];

    // Merge the three aliased node slots into one ordered sequence and
    // clear them; only `request_nodes` survives compaction.
    let mut merged: Vec<RequestNode> = Vec::with_capacity(
        first.request_nodes.len() + first.structured_request_nodes.len() + first.nodes.len(),
    );
    merged.append(&mut first.request_nodes);
    merged.append(&mut first.structured_request_nodes);
    merged.append(&mut first.nodes);

    let Some(summary_pos) = merged.iter().position(RequestNode::is_history_summary) else {
        first.request_nodes = merged;
        return remaining;
    };

    let summary_id = merged[summary_pos].id;
    let summary = match &merged[summary_pos].kind {
        RequestNodeKind::HistorySummary(s) => s.clone(),
        _ => unreachable!("position found by is_history_summary"),
    };

    let mut tool_results: Vec<RequestNode> = Vec::new();
    let mut other_nodes: Vec<RequestNode> = Vec::new();
    for node in merged {
        if node.is_tool_result() {
            tool_results.push(node);
        } else if node.tag() != REQUEST_NODE_HISTORY_SUMMARY
            && node.tag() != REQUEST_NODE_TOOL_RESULT
        {
            other_nodes.push(node);
        }
    }

    match render_history_summary(&summary, tool_results) {
        Some(text) => {
            let mut nodes = Vec::with_capacity(1 + other_nodes.len());
            nodes.push(RequestNode::text(summary_id, text));
            nodes.extend(other_nodes);
            first.request_nodes = nodes;
        }
        None => {
            first.request_nodes = other_nodes;
        }
    }
    remaining
}
