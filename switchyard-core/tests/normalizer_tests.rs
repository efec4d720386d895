//! Tests for loose-input normalization
//!
//! The host sends loosely-typed payloads with years of accumulated field
//! spellings; normalization must accept all of them and never fail, no
//! matter how malformed the input is.

use proptest::prelude::*;
use serde_json::{json, Value};
use test_case::test_case;

use switchyard_core::protocol::nodes::{
    RequestNode, RequestNodeKind, ResponseNode, ResponseNodeKind,
};
use switchyard_core::protocol::request::{normalize_chat_request, ChatHistoryItem};
use switchyard_core::protocol::tags::*;

#[test_case(json!(null); "null body")]
#[test_case(json!("a string"); "string body")]
#[test_case(json!(42); "number body")]
#[test_case(json!([1, 2, 3]); "array body")]
#[test_case(json!({"message": 17, "chat_history": "nope", "rules": {"a": 1}}); "wrong field types")]
fn normalization_accepts_malformed_bodies(body: Value) {
    let req = normalize_chat_request(&body);
    assert!(req.chat_history.is_empty());
    assert!(req.tool_definitions.is_empty());
}

#[test]
fn request_field_aliases_are_honored() {
    let body = json!({
        "prompt": "hello",
        "conversationId": "c-1",
        "agentMemories": "remember",
        "userGuidelines": "be nice",
        "language": "Rust",
        "featureDetectionFlags": {"supportToolUseStart": true},
    });
    let req = normalize_chat_request(&body);
    assert_eq!(req.message, "hello");
    assert_eq!(req.conversation_id, "c-1");
    assert_eq!(req.agent_memories, "remember");
    assert_eq!(req.user_guidelines, "be nice");
    assert_eq!(req.lang, "Rust");
    assert!(req.supports_tool_use_start());
}

#[test]
fn tool_use_start_flag_requires_strict_true() {
    for flag in [json!(1), json!("true"), json!({}), json!(null)] {
        let req = normalize_chat_request(&json!({
            "feature_detection_flags": {"support_tool_use_start": flag}
        }));
        assert!(!req.supports_tool_use_start(), "flag {flag} must not count");
    }
}

#[test]
fn history_item_merges_all_three_request_node_slots_in_order() {
    let item = ChatHistoryItem::from_loose(&json!({
        "request_nodes": [{"id": 1, "type": 0, "text_node": {"content": "a"}}],
        "structuredRequestNodes": [{"id": 2, "type": 0, "text_node": {"content": "b"}}],
        "nodes": [{"id": 3, "type": 0, "text_node": {"content": "c"}}],
    }));
    let ids: Vec<i64> = item.merged_request_nodes().map(|n| n.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn history_item_id_aliases() {
    for key in ["request_id", "requestId", "requestID", "id"] {
        let item = ChatHistoryItem::from_loose(&json!({ key: "r-7" }));
        assert_eq!(item.request_id, "r-7", "alias {key}");
    }
}

#[test]
fn request_node_tags_discriminate() {
    let text = RequestNode::from_loose(&json!({"id": 1, "type": 0, "text_node": {"content": "t"}}));
    assert!(matches!(text.kind, RequestNodeKind::Text { .. }));

    let tool = RequestNode::from_loose(&json!({
        "id": 2, "type": 1,
        "toolResultNode": {"toolUseId": "t1", "content": "ok", "isError": 1}
    }));
    match &tool.kind {
        RequestNodeKind::ToolResult(tr) => {
            assert_eq!(tr.tool_use_id, "t1");
            assert!(tr.is_error);
        }
        other => panic!("unexpected kind: {other:?}"),
    }

    let unknown = RequestNode::from_loose(&json!({"id": 3, "type": 4, "ide_state_node": {}}));
    assert_eq!(unknown.tag(), 4);
    assert!(matches!(unknown.kind, RequestNodeKind::Unknown { .. }));
}

#[test]
fn response_node_tags_discriminate() {
    let raw = ResponseNode::from_loose(&json!({"id": 1, "type": 0, "content": "He"}));
    assert_eq!(raw.tag(), RESPONSE_NODE_RAW_RESPONSE);

    let finished = ResponseNode::from_loose(&json!({"id": 2, "nodeType": 2, "content": "Hello"}));
    assert!(matches!(
        finished.kind,
        ResponseNodeKind::MainTextFinished { .. }
    ));

    let thinking = ResponseNode::from_loose(&json!({
        "id": 3, "type": 8, "thinking": {"summary": "hmm"}
    }));
    assert_eq!(
        thinking.kind,
        ResponseNodeKind::Thinking { summary: "hmm".into() }
    );

    let start = ResponseNode::from_loose(&json!({
        "id": 4, "type": 7, "tool_use": {"tool_name": "view", "tool_use_id": "t"}
    }));
    assert_eq!(start.tag(), RESPONSE_NODE_TOOL_USE_START);
}

#[test]
fn string_tags_parse_and_garbage_tags_are_sentinel() {
    let node = RequestNode::from_loose(&json!({"type": "10", "history_summary_node": {"message_template": "x"}}));
    assert!(node.is_history_summary());

    let node = RequestNode::from_loose(&json!({"type": "ten"}));
    assert_eq!(node.tag(), NODE_TAG_UNKNOWN);
}

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        any::<f64>().prop_map(|f| serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null)),
        "[a-zA-Z0-9_\\- \\n]{0,24}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map(
                prop_oneof![
                    Just("message".to_string()),
                    Just("chat_history".to_string()),
                    Just("request_nodes".to_string()),
                    Just("nodes".to_string()),
                    Just("type".to_string()),
                    Just("tool_definitions".to_string()),
                    Just("history_summary_node".to_string()),
                    Just("rules".to_string()),
                    "[a-z_]{1,12}",
                ],
                inner,
                0..6
            )
            .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    /// Whatever the host sends, normalization returns a request instead of
    /// panicking or erroring.
    #[test]
    fn normalization_never_panics(body in arb_json()) {
        let _ = normalize_chat_request(&body);
    }

    #[test]
    fn node_normalization_never_panics(node in arb_json()) {
        let _ = RequestNode::from_loose(&node);
        let _ = ResponseNode::from_loose(&node);
    }
}
