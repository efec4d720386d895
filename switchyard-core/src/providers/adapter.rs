//! Provider adapter contracts
//!
//! The gateway talks to exactly two provider families through these traits;
//! the literal HTTP calls and SSE parsing live behind them, in the host.
//! Each family gets its own message-array shaping before the adapter is
//! invoked, and every call carries a cancellation token the adapter is
//! expected to honor cooperatively.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use crate::config::ProviderConfig;
use crate::error::GatewayError;
use crate::protocol::envelope::ChatChunk;
use crate::tools::{AnthropicToolSpec, OpenAiToolSpec, ToolMeta};

use super::error::ProviderResult;

/// Streamed text deltas from a provider.
pub type TextDeltaStream = BoxStream<'static, ProviderResult<String>>;

/// Streamed chat chunks, already translated into the internal envelope.
pub type ChatChunkStream = BoxStream<'static, ProviderResult<ChatChunk>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    System,
    User,
    Assistant,
    Tool,
}

/// A provider-bound message in the shared plain-text shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireMessage {
    pub role: WireRole,
    pub content: String,
}

impl WireMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: WireRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: WireRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: WireRole::Assistant, content: content.into() }
    }
}

/// OpenAI-compatible shaping: the system prompt becomes a leading system
/// message and empty-content messages are dropped.
pub fn as_openai_messages(system: &str, messages: Vec<WireMessage>) -> Vec<WireMessage> {
    std::iter::once(WireMessage::system(system))
        .chain(messages)
        .filter(|m| !m.content.is_empty())
        .collect()
}

/// Anthropic shaping: the system prompt travels separately and the message
/// list keeps only user/assistant entries with non-empty content.
pub fn as_anthropic_messages(system: &str, messages: Vec<WireMessage>) -> (String, Vec<WireMessage>) {
    let messages = messages
        .into_iter()
        .filter(|m| {
            matches!(m.role, WireRole::User | WireRole::Assistant) && !m.content.is_empty()
        })
        .collect();
    (system.trim().to_string(), messages)
}

/// Everything an adapter needs to place one call.
#[derive(Debug, Clone)]
pub struct CallContext {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
    pub cancel: CancellationToken,
    pub extra_headers: HashMap<String, String>,
    pub request_defaults: Map<String, Value>,
}

/// The two provider families the gateway can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAiCompat,
    Anthropic,
}

impl ProviderKind {
    pub fn from_type_str(provider_type: &str) -> Option<Self> {
        match provider_type {
            "openai_compatible" => Some(Self::OpenAiCompat),
            "anthropic" => Some(Self::Anthropic),
            _ => None,
        }
    }
}

/// Validate a provider record and build the call context. Fails fast --
/// before any network call -- on a missing API key or an unknown type.
pub fn provider_call_context(
    provider: &ProviderConfig,
    model: &str,
    timeout: Duration,
    cancel: CancellationToken,
) -> Result<(ProviderKind, CallContext), GatewayError> {
    let api_key = provider.api_key.trim();
    if api_key.is_empty() {
        return Err(GatewayError::Configuration(format!(
            "{} has no api_key configured",
            provider.label()
        )));
    }
    let provider_type = provider.provider_type.trim();
    let kind = ProviderKind::from_type_str(provider_type)
        .ok_or_else(|| GatewayError::UnknownProviderType(provider_type.to_string()))?;
    Ok((
        kind,
        CallContext {
            base_url: provider.base_url.trim().to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            timeout,
            cancel,
            extra_headers: provider.headers.clone(),
            request_defaults: provider.request_defaults.clone(),
        },
    ))
}

/// A chat call bound for an OpenAI-compatible provider.
#[derive(Debug, Clone)]
pub struct OpenAiChatCall {
    pub messages: Vec<WireMessage>,
    pub tools: Vec<OpenAiToolSpec>,
    pub tool_meta: HashMap<String, ToolMeta>,
    pub support_tool_use_start: bool,
}

/// A chat call bound for an Anthropic provider.
#[derive(Debug, Clone)]
pub struct AnthropicChatCall {
    pub system: String,
    pub messages: Vec<WireMessage>,
    pub tools: Vec<AnthropicToolSpec>,
    pub tool_meta: HashMap<String, ToolMeta>,
    pub support_tool_use_start: bool,
}

/// Adapter for OpenAI-compatible providers.
#[async_trait]
pub trait OpenAiCompatAdapter: Send + Sync {
    /// One-shot text completion.
    async fn complete_text(
        &self,
        ctx: CallContext,
        messages: Vec<WireMessage>,
    ) -> ProviderResult<String>;

    /// Streamed text deltas.
    async fn stream_text_deltas(
        &self,
        ctx: CallContext,
        messages: Vec<WireMessage>,
    ) -> ProviderResult<TextDeltaStream>;

    /// Streamed structured chat chunks.
    async fn chat_stream(
        &self,
        ctx: CallContext,
        call: OpenAiChatCall,
    ) -> ProviderResult<ChatChunkStream>;
}

/// Adapter for Anthropic providers.
#[async_trait]
pub trait AnthropicAdapter: Send + Sync {
    async fn complete_text(
        &self,
        ctx: CallContext,
        system: String,
        messages: Vec<WireMessage>,
    ) -> ProviderResult<String>;

    async fn stream_text_deltas(
        &self,
        ctx: CallContext,
        system: String,
        messages: Vec<WireMessage>,
    ) -> ProviderResult<TextDeltaStream>;

    async fn chat_stream(
        &self,
        ctx: CallContext,
        call: AnthropicChatCall,
    ) -> ProviderResult<ChatChunkStream>;
}
