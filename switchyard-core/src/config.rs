//! Gateway configuration contract
//!
//! Loading, persistence and editing of this configuration belong to the
//! host; the gateway only reads it through `ConfigSource`. Field aliases
//! accept both the snake_case and camelCase spellings the host has shipped.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_UPSTREAM_TIMEOUT_MS: u64 = 120_000;

fn default_upstream_ms() -> u64 {
    DEFAULT_UPSTREAM_TIMEOUT_MS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_upstream_ms", alias = "upstreamMs")]
    pub upstream_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { upstream_ms: DEFAULT_UPSTREAM_TIMEOUT_MS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TelemetryConfig {
    /// Endpoints the host has opted out of; the gateway answers these with
    /// stubs instead of provider calls.
    #[serde(default, alias = "disabledEndpoints")]
    pub disabled_endpoints: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RoutingConfig {
    #[serde(default, alias = "defaultProviderId")]
    pub default_provider_id: String,
}

/// A user-supplied (BYOK) provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProviderConfig {
    #[serde(default)]
    pub id: String,
    /// `openai_compatible` or `anthropic`; anything else fails fast at
    /// dispatch time, before any network call.
    #[serde(default, rename = "type")]
    pub provider_type: String,
    #[serde(default, alias = "baseUrl")]
    pub base_url: String,
    #[serde(default, alias = "apiKey")]
    pub api_key: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default, alias = "requestDefaults")]
    pub request_defaults: Map<String, Value>,
    #[serde(default, alias = "defaultModel")]
    pub default_model: String,
    #[serde(default)]
    pub models: Vec<String>,
}

impl ProviderConfig {
    /// Human-readable label for error messages.
    pub fn label(&self) -> String {
        let id = self.id.trim();
        let kind = self.provider_type.trim();
        let name = if !id.is_empty() {
            id
        } else if !kind.is_empty() {
            kind
        } else {
            "unknown"
        };
        format!("Provider({})", name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

impl Config {
    pub fn is_telemetry_disabled(&self, endpoint: &str) -> bool {
        self.telemetry
            .disabled_endpoints
            .iter()
            .any(|e| e == endpoint)
    }

    /// The provider routing currently points at: the configured default,
    /// falling back to the first configured provider.
    pub fn active_provider(&self) -> Option<&ProviderConfig> {
        let wanted = self.routing.default_provider_id.trim();
        if !wanted.is_empty() {
            if let Some(p) = self.providers.iter().find(|p| p.id.trim() == wanted) {
                return Some(p);
            }
            return None;
        }
        self.providers.first()
    }
}

/// Read access to the host-managed configuration.
pub trait ConfigSource: Send + Sync {
    fn get(&self) -> Arc<Config>;

    /// Whether gateway routing is switched on at all. When off, every call
    /// falls through to the official backend untouched.
    fn runtime_enabled(&self) -> bool {
        true
    }
}

/// A fixed configuration, for hosts that reload by swapping the source and
/// for tests.
#[derive(Debug, Clone)]
pub struct StaticConfigSource {
    config: Arc<Config>,
    runtime_enabled: bool,
}

impl StaticConfigSource {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            runtime_enabled: true,
        }
    }

    pub fn with_runtime_enabled(mut self, enabled: bool) -> Self {
        self.runtime_enabled = enabled;
        self
    }
}

impl ConfigSource for StaticConfigSource {
    fn get(&self) -> Arc<Config> {
        self.config.clone()
    }

    fn runtime_enabled(&self) -> bool {
        self.runtime_enabled
    }
}
