//! Tool definition translation
//!
//! Converts the host's provider-agnostic tool definitions into the tool-spec
//! shapes each provider family expects. Definitions without a usable name
//! are dropped; first-seen order is preserved and names are deliberately not
//! deduplicated (the host may define the same tool twice, and both survive
//! into the provider-bound arrays).

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{json, Value};

use crate::protocol::loose::{array_of, pick, string_of};

/// A normalized, provider-agnostic tool definition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// Structured input schema, kept as-is when the host sent one.
    pub input_schema: Option<Value>,
    /// Serialized-JSON fallback schema, resolved lazily.
    pub input_schema_json: String,
    /// MCP attribution, used only for telemetry lookup -- never sent upstream.
    pub mcp_server_name: String,
    pub mcp_tool_name: String,
}

/// OpenAI-style function spec.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenAiToolSpec {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: OpenAiFunctionSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenAiFunctionSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: Value,
}

/// Anthropic-style tool spec.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnthropicToolSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_schema: Value,
}

/// MCP attribution for a tool name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolMeta {
    pub mcp_server_name: Option<String>,
    pub mcp_tool_name: Option<String>,
}

/// Normalize a loose tool-definition list. Entries whose name is empty
/// after trimming are dropped; everything else passes through.
pub fn normalize_tool_definitions(raw: &Value) -> Vec<ToolDefinition> {
    array_of(Some(raw))
        .iter()
        .filter_map(|entry| {
            let name = string_of(pick(entry, &["name"])).trim().to_string();
            if name.is_empty() {
                return None;
            }
            let input_schema = pick(entry, &["input_schema", "inputSchema"])
                .filter(|v| v.is_object() || v.is_array())
                .cloned();
            Some(ToolDefinition {
                name,
                description: string_of(pick(entry, &["description"])),
                input_schema,
                input_schema_json: string_of(pick(
                    entry,
                    &["input_schema_json", "inputSchemaJson"],
                )),
                mcp_server_name: string_of(pick(entry, &["mcp_server_name", "mcpServerName"])),
                mcp_tool_name: string_of(pick(entry, &["mcp_tool_name", "mcpToolName"])),
            })
        })
        .collect()
}

/// Resolve a definition's input schema: prefer a structured non-array
/// object, then a JSON string that parses to one, then the empty object
/// schema. Parse failures are absorbed, never raised.
pub fn resolve_tool_schema(def: &ToolDefinition) -> Value {
    if let Some(schema) = &def.input_schema {
        if schema.is_object() {
            return schema.clone();
        }
    }
    let raw = def.input_schema_json.trim();
    if !raw.is_empty() {
        if let Ok(parsed) = serde_json::from_str::<Value>(raw) {
            if parsed.is_object() {
                return parsed;
            }
        }
    }
    json!({"type": "object", "properties": {}})
}

fn description_of(def: &ToolDefinition) -> Option<String> {
    let trimmed = def.description.trim();
    (!trimmed.is_empty()).then(|| def.description.clone())
}

pub fn convert_openai_tools(defs: &[ToolDefinition]) -> Vec<OpenAiToolSpec> {
    defs.iter()
        .map(|d| OpenAiToolSpec {
            kind: "function",
            function: OpenAiFunctionSpec {
                name: d.name.clone(),
                description: description_of(d),
                parameters: resolve_tool_schema(d),
            },
        })
        .collect()
}

pub fn convert_anthropic_tools(defs: &[ToolDefinition]) -> Vec<AnthropicToolSpec> {
    defs.iter()
        .map(|d| AnthropicToolSpec {
            name: d.name.clone(),
            description: description_of(d),
            input_schema: resolve_tool_schema(d),
        })
        .collect()
}

/// Build the name -> MCP attribution lookup. Tools with neither MCP field
/// are skipped; later definitions of the same name win.
pub fn build_tool_meta_by_name(defs: &[ToolDefinition]) -> HashMap<String, ToolMeta> {
    let mut map = HashMap::new();
    for d in defs {
        let name = d.name.trim();
        if name.is_empty() {
            continue;
        }
        let server = d.mcp_server_name.trim();
        let tool = d.mcp_tool_name.trim();
        if server.is_empty() && tool.is_empty() {
            continue;
        }
        map.insert(
            name.to_string(),
            ToolMeta {
                mcp_server_name: (!server.is_empty()).then(|| server.to_string()),
                mcp_tool_name: (!tool.is_empty()).then(|| tool.to_string()),
            },
        );
    }
    map
}
