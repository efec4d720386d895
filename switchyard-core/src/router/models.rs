//! Model listing: BYOK synthesis and upstream merge
//!
//! The official backend's list is authoritative when reachable; BYOK models
//! synthesized from configuration are appended (dedup by name, upstream
//! order preserved) and the feature flags are recomputed so the host's
//! model registry sees the gateway's models. When the official list cannot
//! be fetched, a purely local list is served instead -- the upstream error
//! never reaches the caller.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::protocol::envelope::{GetModelsResult, ModelInfo};

/// Access to the official backend's model listing. The connection details
/// (completion URL, stored API token) live with the host; the optional
/// override carries a fresher bearer token from the current call.
#[async_trait]
pub trait OfficialModelCatalog: Send + Sync {
    async fn fetch_models(
        &self,
        token_override: Option<&str>,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> anyhow::Result<Value>;
}

/// `byok:<provider-id>:<model>` names for every configured provider model,
/// deduplicated in first-seen order.
pub fn build_byok_model_names(config: &Config) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for provider in &config.providers {
        let id = provider.id.trim();
        if id.is_empty() {
            continue;
        }
        let mut models: Vec<&str> = provider
            .models
            .iter()
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .collect();
        if models.is_empty() && !provider.default_model.trim().is_empty() {
            models.push(provider.default_model.trim());
        }
        for model in models {
            let name = format!("byok:{}:{}", id, model);
            if seen.insert(name.clone()) {
                out.push(name);
            }
        }
    }
    out
}

/// The default the merged listing should advertise: the active provider's
/// default model when it exists among the BYOK names, else the first BYOK
/// name, else empty.
pub fn preferred_default_model(config: &Config, byok_models: &[String]) -> String {
    let active = config.active_provider();
    let active_id = active.map(|p| p.id.trim()).unwrap_or_default();
    let active_model = active
        .map(|p| {
            let m = p.default_model.trim();
            if m.is_empty() {
                p.models.first().map(|m| m.trim()).unwrap_or_default()
            } else {
                m
            }
        })
        .unwrap_or_default();

    if !active_id.is_empty() && !active_model.is_empty() {
        let preferred = format!("byok:{}:{}", active_id, active_model);
        if byok_models.iter().any(|m| m == &preferred) {
            return preferred;
        }
    }
    byok_models.first().cloned().unwrap_or_default()
}

/// Recompute the model-registry feature flags on top of whatever the
/// upstream listing carried.
pub fn ensure_model_registry_feature_flags(
    base: &Map<String, Value>,
    byok_model_ids: &[String],
    default_model: &str,
    agent_chat_model: &str,
) -> Map<String, Value> {
    let mut flags = base.clone();
    flags.insert(
        "byok_model_ids".to_string(),
        Value::Array(byok_model_ids.iter().map(|m| Value::String(m.clone())).collect()),
    );
    flags.insert(
        "default_model".to_string(),
        Value::String(default_model.to_string()),
    );
    flags.insert(
        "agent_chat_model".to_string(),
        Value::String(agent_chat_model.to_string()),
    );
    flags
}

/// Merge BYOK names into the upstream listing: dedup by name, upstream
/// order preserved, BYOK entries appended. Upstream fields the gateway does
/// not understand pass through untouched.
pub fn merge_models(upstream: Value, byok_models: &[String], preferred_default: &str) -> Value {
    let mut base = match upstream {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    let mut models: Vec<Value> = base
        .get("models")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let mut existing: HashSet<String> = models
        .iter()
        .filter_map(|m| m.get("name").and_then(Value::as_str))
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect();
    for name in byok_models {
        if name.is_empty() || existing.contains(name) {
            continue;
        }
        models.push(model_info_value(name));
        existing.insert(name.clone());
    }

    let base_default = base
        .get("default_model")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            models
                .first()
                .and_then(|m| m.get("name").and_then(Value::as_str))
                .unwrap_or("unknown")
                .to_string()
        });
    let default_model = if preferred_default.is_empty() {
        base_default
    } else {
        preferred_default.to_string()
    };

    let base_flags = match base.get("feature_flags") {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };
    let flags =
        ensure_model_registry_feature_flags(&base_flags, byok_models, &default_model, &default_model);

    base.insert("default_model".to_string(), Value::String(default_model));
    base.insert("models".to_string(), Value::Array(models));
    base.insert("feature_flags".to_string(), Value::Object(flags));
    Value::Object(base)
}

fn model_info_value(name: &str) -> Value {
    serde_json::to_value(ModelInfo::new(name)).unwrap_or_else(|_| Value::Null)
}

/// The locally synthesized listing served when the official fetch fails.
pub fn local_models_result(byok_models: &[String], preferred_default: &str) -> GetModelsResult {
    let default_model = if preferred_default.is_empty() {
        "unknown".to_string()
    } else {
        preferred_default.to_string()
    };
    GetModelsResult {
        models: byok_models.iter().map(|m| model_info_value(m)).collect(),
        default_model: default_model.clone(),
        feature_flags: ensure_model_registry_feature_flags(
            &Map::new(),
            byok_models,
            &default_model,
            &default_model,
        ),
    }
}
