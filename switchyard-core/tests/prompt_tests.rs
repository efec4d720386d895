//! Tests for system prompt assembly

use serde_json::json;

use switchyard_core::prompt::{build_system_prompt, coerce_rules_text};
use switchyard_core::protocol::request::normalize_chat_request;

#[test]
fn fragments_concatenate_in_contract_order() {
    let req = normalize_chat_request(&json!({
        "prefix": " intro ",
        "user_guidelines": "user rules",
        "workspace_guidelines": "workspace rules",
        "rules": ["one", "", "two"],
        "agent_memories": "memory",
        "mode": "agent",
        "lang": "Rust",
        "path": "src/lib.rs",
        "suffix": "tail",
    }));
    let prompt = build_system_prompt(&req);
    let expected = "intro\n\nuser rules\n\nworkspace rules\n\none\ntwo\n\nmemory\n\n\
                    You are an AI coding assistant with access to tools. Use tools when needed to complete tasks.\n\n\
                    The user is working with Rust code.\n\nCurrent file path: src/lib.rs\n\nSuffix:\ntail";
    assert_eq!(prompt, expected);
}

#[test]
fn blank_fragments_are_skipped() {
    let req = normalize_chat_request(&json!({
        "prefix": "   ",
        "user_guidelines": "only this",
        "suffix": "",
    }));
    assert_eq!(build_system_prompt(&req), "only this");
}

#[test]
fn agent_mode_sentence_is_case_insensitive() {
    for mode in ["AGENT", "agent", "Agent"] {
        let req = normalize_chat_request(&json!({ "mode": mode }));
        assert!(
            build_system_prompt(&req).contains("AI coding assistant"),
            "mode {mode}"
        );
    }
    let req = normalize_chat_request(&json!({ "mode": "CHAT" }));
    assert!(!build_system_prompt(&req).contains("AI coding assistant"));
}

#[test]
fn rules_coercion_handles_arrays_and_scalars() {
    assert_eq!(coerce_rules_text(&json!(["a", "  ", "b", null, {"x": 1}])), "a\nb");
    assert_eq!(coerce_rules_text(&json!("  single rule  ")), "single rule");
    assert_eq!(coerce_rules_text(&json!(7)), "7");
    assert_eq!(coerce_rules_text(&json!(null)), "");
    assert_eq!(coerce_rules_text(&json!({"not": "rules"})), "");
}

#[test]
fn assembly_is_pure_and_order_stable() {
    let req = normalize_chat_request(&json!({
        "prefix": "p",
        "rules": ["r1", "r2"],
        "lang": "Go",
        "suffix": "s",
    }));
    assert_eq!(build_system_prompt(&req), build_system_prompt(&req));
}
