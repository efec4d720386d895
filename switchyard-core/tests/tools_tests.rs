//! Tests for tool definition translation

use serde_json::{json, Value};

use switchyard_core::tools::{
    build_tool_meta_by_name, convert_anthropic_tools, convert_openai_tools,
    normalize_tool_definitions, resolve_tool_schema, ToolDefinition,
};

#[test]
fn definitions_without_a_name_are_dropped() {
    let defs = normalize_tool_definitions(&json!([
        {"name": "view", "description": "look at a file"},
        {"name": "   "},
        {"description": "anonymous"},
        {"name": "edit"},
    ]));
    let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["view", "edit"]);
}

#[test]
fn duplicate_names_survive_into_provider_arrays() {
    let defs = normalize_tool_definitions(&json!([
        {"name": "view", "description": "first"},
        {"name": "view", "description": "second"},
    ]));
    let openai = convert_openai_tools(&defs);
    assert_eq!(openai.len(), 2);
    let anthropic = convert_anthropic_tools(&defs);
    assert_eq!(anthropic.len(), 2);
    assert_eq!(anthropic[0].description.as_deref(), Some("first"));
    assert_eq!(anthropic[1].description.as_deref(), Some("second"));
}

#[test]
fn schema_resolution_prefers_structured_object() {
    let defs = normalize_tool_definitions(&json!([{
        "name": "view",
        "input_schema": {"type": "object", "properties": {"path": {"type": "string"}}},
        "input_schema_json": "{\"type\":\"object\",\"properties\":{}}",
    }]));
    let schema = resolve_tool_schema(&defs[0]);
    assert!(schema["properties"]["path"].is_object());
}

#[test]
fn schema_resolution_parses_json_string_fallback() {
    let defs = normalize_tool_definitions(&json!([{
        "name": "view",
        "inputSchemaJson": "{\"type\":\"object\",\"properties\":{\"x\":{}}}",
    }]));
    let schema = resolve_tool_schema(&defs[0]);
    assert!(schema["properties"]["x"].is_object());
}

#[test]
fn unparseable_schema_string_falls_back_to_empty_object_schema() {
    let def = ToolDefinition {
        name: "view".into(),
        input_schema_json: "not json".into(),
        ..ToolDefinition::default()
    };
    assert_eq!(
        resolve_tool_schema(&def),
        json!({"type": "object", "properties": {}})
    );
}

#[test]
fn array_schemas_are_rejected_at_both_levels() {
    let def = ToolDefinition {
        name: "view".into(),
        input_schema: Some(json!([1, 2])),
        input_schema_json: "[3, 4]".into(),
        ..ToolDefinition::default()
    };
    assert_eq!(
        resolve_tool_schema(&def),
        json!({"type": "object", "properties": {}})
    );
}

#[test]
fn blank_description_is_omitted_entirely_from_wire_specs() {
    let defs = normalize_tool_definitions(&json!([
        {"name": "bare", "description": "  "},
        {"name": "documented", "description": "does things"},
    ]));

    let openai = serde_json::to_value(convert_openai_tools(&defs)).unwrap();
    assert!(openai[0]["function"].get("description").is_none());
    assert_eq!(openai[0]["type"], "function");
    assert_eq!(openai[1]["function"]["description"], "does things");

    let anthropic = serde_json::to_value(convert_anthropic_tools(&defs)).unwrap();
    assert!(anthropic[0].get("description").is_none());
    assert_eq!(anthropic[1]["description"], "does things");
    assert!(anthropic[0]["input_schema"].is_object());
}

#[test]
fn tool_meta_map_skips_tools_without_mcp_fields() {
    let defs = normalize_tool_definitions(&json!([
        {"name": "plain"},
        {"name": "mcp-tool", "mcpServerName": "srv", "mcp_tool_name": "inner"},
        {"name": "half", "mcp_server_name": "only-server"},
    ]));
    let meta = build_tool_meta_by_name(&defs);
    assert!(!meta.contains_key("plain"));
    let full = &meta["mcp-tool"];
    assert_eq!(full.mcp_server_name.as_deref(), Some("srv"));
    assert_eq!(full.mcp_tool_name.as_deref(), Some("inner"));
    let half = &meta["half"];
    assert_eq!(half.mcp_server_name.as_deref(), Some("only-server"));
    assert_eq!(half.mcp_tool_name, None);
}

#[test]
fn non_array_input_is_an_empty_definition_list() {
    assert!(normalize_tool_definitions(&json!(null)).is_empty());
    assert!(normalize_tool_definitions(&json!("tools")).is_empty());
    assert!(normalize_tool_definitions(&Value::Object(Default::default())).is_empty());
}
