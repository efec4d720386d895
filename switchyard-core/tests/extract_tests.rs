//! Tests for the response extractor

use serde_json::json;

use switchyard_core::extract::{extract_assistant_text, extract_tool_calls};
use switchyard_core::protocol::nodes::ResponseNode;

fn nodes(raw: serde_json::Value) -> Vec<ResponseNode> {
    raw.as_array()
        .expect("array fixture")
        .iter()
        .map(ResponseNode::from_loose)
        .collect()
}

#[test]
fn finished_text_supersedes_streamed_fragments() {
    let out = extract_assistant_text(&nodes(json!([
        {"id": 1, "type": 0, "content": "He"},
        {"id": 2, "type": 0, "content": "llo"},
        {"id": 3, "type": 2, "content": "Hello"},
    ])));
    assert_eq!(out, "Hello");
}

#[test]
fn raw_fragments_concatenate_when_nothing_finished() {
    let out = extract_assistant_text(&nodes(json!([
        {"id": 1, "type": 0, "content": "He"},
        {"id": 2, "type": 0, "content": "llo"},
    ])));
    assert_eq!(out, "Hello");
}

#[test]
fn last_nonblank_finished_node_wins() {
    let out = extract_assistant_text(&nodes(json!([
        {"id": 1, "type": 2, "content": "first"},
        {"id": 2, "type": 2, "content": "   "},
        {"id": 3, "type": 2, "content": "second"},
    ])));
    assert_eq!(out, "second");
}

#[test]
fn duplicate_tool_call_ids_are_suppressed_first_wins() {
    let calls = extract_tool_calls(&nodes(json!([
        {"id": 1, "type": 5, "tool_use": {"tool_name": "view", "tool_use_id": "t1", "input_json": "{\"a\":1}"}},
        {"id": 2, "type": 5, "tool_use": {"tool_name": "edit", "tool_use_id": "t1", "input_json": "{\"b\":2}"}},
    ])));
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].name, "view");
    assert_eq!(calls[0].arguments, "{\"a\":1}");
}

#[test]
fn nameless_tool_calls_are_dropped() {
    let calls = extract_tool_calls(&nodes(json!([
        {"id": 1, "type": 5, "tool_use": {"tool_use_id": "t1", "input_json": "{}"}},
        {"id": 2, "type": 5, "tool_use": {"tool_name": "  ", "tool_use_id": "t2"}},
        {"id": 3, "type": 5, "tool_use": {"tool_name": "view", "tool_use_id": "t3"}},
    ])));
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].name, "view");
}

#[test]
fn missing_ids_and_arguments_get_defaults() {
    let calls = extract_tool_calls(&nodes(json!([
        {"id": 1, "type": 5, "tool_use": {"tool_name": "view"}},
        {"id": 2, "type": 5, "tool_use": {"tool_name": "edit"}},
    ])));
    assert_eq!(calls[0].id, "tool-1");
    assert_eq!(calls[1].id, "tool-2");
    assert_eq!(calls[0].arguments, "{}");
}

#[test]
fn tool_use_start_nodes_are_fallback_only() {
    let mixed = nodes(json!([
        {"id": 1, "type": 7, "tool_use": {"tool_name": "started", "tool_use_id": "s1"}},
        {"id": 2, "type": 5, "tool_use": {"tool_name": "full", "tool_use_id": "f1"}},
    ]));
    let calls = extract_tool_calls(&mixed);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].name, "full");

    let only_started = nodes(json!([
        {"id": 1, "type": 7, "tool_use": {"tool_name": "started", "tool_use_id": "s1"}},
    ]));
    let calls = extract_tool_calls(&only_started);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].name, "started");
}

#[test]
fn unrelated_nodes_contribute_nothing() {
    let out = nodes(json!([
        {"id": 1, "type": 8, "thinking": {"summary": "pondering"}},
        {"id": 2, "type": 9, "billing": {}},
    ]));
    assert_eq!(extract_assistant_text(&out), "");
    assert!(extract_tool_calls(&out).is_empty());
}
