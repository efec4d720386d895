//! Alias-tolerant access to loosely-typed request payloads
//!
//! The host has changed field-naming conventions across versions without a
//! migration step, so every lookup walks an ordered alias list (snake_case,
//! camelCase, legacy names) and takes the first key that is present -- even
//! when its value is explicitly falsy. Coercions never fail: wrong types
//! collapse to the documented safe defaults.

use serde_json::{Map, Value};

/// Look up the first present key from an ordered alias list.
///
/// Presence is what matters, not truthiness: a key holding `null`, `0` or
/// `""` still wins over a later alias. Non-object values have no keys.
pub fn pick<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let obj = value.as_object()?;
    keys.iter().find_map(|k| obj.get(*k))
}

/// Coerce to a string: `null`/missing and structured values become `""`,
/// scalars are stringified.
pub fn string_of(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Coerce to an array slice; anything that is not an array is empty.
pub fn array_of(value: Option<&Value>) -> &[Value] {
    value.and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

/// Coerce to an object map; anything that is not an object is empty.
pub fn record_of(value: Option<&Value>) -> Map<String, Value> {
    match value {
        Some(Value::Object(m)) => m.clone(),
        _ => Map::new(),
    }
}

/// Numeric coercion with the producer's (JavaScript) semantics: strings
/// parse after trimming (blank parses to 0), booleans map to 0/1, `null`
/// maps to 0, and everything else is not a number.
pub fn number_of(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                Some(0.0)
            } else {
                t.parse::<f64>().ok()
            }
        }
        _ => None,
    }
}

/// Type-tag coercion: finite whole numbers pass through, everything else
/// collapses to the `-1` sentinel.
pub fn tag_of(value: Option<&Value>) -> i64 {
    match number_of(value) {
        Some(n) if n.is_finite() && n.fract() == 0.0 => n as i64,
        _ => -1,
    }
}

/// Count coercion: unparseable values collapse to 0.
pub fn count_of(value: Option<&Value>) -> i64 {
    match number_of(value) {
        Some(n) if n.is_finite() => n.trunc() as i64,
        _ => 0,
    }
}

/// Truthiness with the producer's semantics: empty strings, zero, `NaN` and
/// `null` are false; objects and arrays are always true.
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        _ => false,
    }
}

/// A placeholder message is a short run of dashes the host inserts where the
/// user typed nothing (at most 16 characters, nothing but `-`).
pub fn is_placeholder_message(message: &str) -> bool {
    let s = message.trim();
    !s.is_empty() && s.chars().count() <= 16 && s.chars().all(|c| c == '-')
}

/// Parse a serialized JSON object, absorbing every failure mode into `{}`:
/// blank input, parse errors, and values that parse to non-objects.
pub fn parse_json_object_or_empty(raw: &str) -> Map<String, Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Map::new();
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(m)) => m,
        _ => Map::new(),
    }
}

/// Render an arbitrary value as a `label: <json>` line for prompt text.
/// Nulls and unserializable values render as nothing.
pub fn format_node_value(label: &str, value: &Value) -> String {
    let label = label.trim();
    let label = if label.is_empty() { "Node" } else { label };
    if value.is_null() {
        return String::new();
    }
    match serde_json::to_string(value) {
        Ok(s) if !s.is_empty() && s != "null" => format!("{}: {}", label, s),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pick_returns_explicitly_falsy_values() {
        let v = json!({"request_id": "", "id": "late"});
        assert_eq!(pick(&v, &["request_id", "id"]), Some(&json!("")));
    }

    #[test]
    fn pick_on_non_object_is_none() {
        assert_eq!(pick(&json!([1, 2]), &["0"]), None);
        assert_eq!(pick(&json!("x"), &["x"]), None);
    }

    #[test]
    fn tag_coercion_matches_producer_semantics() {
        assert_eq!(tag_of(Some(&json!(5))), 5);
        assert_eq!(tag_of(Some(&json!("7"))), 7);
        assert_eq!(tag_of(Some(&json!(null))), 0);
        assert_eq!(tag_of(Some(&json!("abc"))), -1);
        assert_eq!(tag_of(Some(&json!(1.5))), -1);
        assert_eq!(tag_of(None), -1);
    }

    #[test]
    fn placeholder_detection() {
        assert!(is_placeholder_message("---"));
        assert!(is_placeholder_message("  ----  "));
        assert!(!is_placeholder_message(""));
        assert!(!is_placeholder_message("-- fix this --"));
        assert!(!is_placeholder_message(&"-".repeat(17)));
    }

    #[test]
    fn json_object_fallback_absorbs_garbage() {
        assert!(parse_json_object_or_empty("not json").is_empty());
        assert!(parse_json_object_or_empty("[1,2]").is_empty());
        assert_eq!(
            parse_json_object_or_empty(r#"{"a":1}"#).get("a"),
            Some(&json!(1))
        );
    }
}
