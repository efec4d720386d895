//! Endpoint dispatch
//!
//! The gateway receives a call for one of the host's endpoints together
//! with an externally-decided route, performs whatever translation the
//! endpoint needs, invokes the matching provider adapter (one-shot or
//! streaming), and reshapes the result into the envelope the caller
//! expects. Unrecognized endpoints and officially-routed calls return the
//! not-handled sentinel so the caller can proxy to the official backend
//! unchanged.

pub mod models;
pub mod next_edit;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::StreamExt;
use futures::stream::BoxStream;
use serde::Serialize;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::{Config, ConfigSource, ProviderConfig};
use crate::error::{GatewayError, GatewayResult};
use crate::history::summarize::{HistorySummarizer, NoopSummarizer, SummaryContext, SummaryOutcome};
use crate::prompt::build_system_prompt;
use crate::protocol::envelope::{
    ChatChunk, ChatResult, CompletionResult, NextEditGenerationChunk, NextEditLocationResult,
    TextResult,
};
use crate::protocol::loose::{pick, string_of};
use crate::protocol::request::normalize_chat_request;
use crate::providers::adapter::{
    as_anthropic_messages, as_openai_messages, provider_call_context, AnthropicAdapter,
    AnthropicChatCall, OpenAiChatCall, OpenAiCompatAdapter, ProviderKind, TextDeltaStream,
    WireMessage,
};
use crate::providers::messages::{
    build_anthropic_chat_messages, build_messages_for_endpoint, build_openai_chat_messages,
};
use crate::tools::{build_tool_meta_by_name, convert_anthropic_tools, convert_openai_tools};

use models::{
    build_byok_model_names, local_models_result, merge_models, preferred_default_model,
    OfficialModelCatalog,
};
use next_edit::{pick_next_edit_location_candidates, selection_bounds};

/// Model listing never waits longer than this, regardless of the caller's
/// timeout.
const MODEL_LIST_TIMEOUT_CAP: Duration = Duration::from_secs(12);

/// The endpoints the gateway recognizes. Names are exact, case-sensitive,
/// and carry their leading slash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    GetModels,
    Completion,
    ChatInputCompletion,
    Edit,
    Chat,
    NextEditLoc,
    ChatStream,
    PromptEnhancer,
    GenerateConversationTitle,
    InstructionStream,
    SmartPasteStream,
    GenerateCommitMessageStream,
    NextEditStream,
}

impl Endpoint {
    pub const ALL: [Endpoint; 13] = [
        Endpoint::GetModels,
        Endpoint::Completion,
        Endpoint::ChatInputCompletion,
        Endpoint::Edit,
        Endpoint::Chat,
        Endpoint::NextEditLoc,
        Endpoint::ChatStream,
        Endpoint::PromptEnhancer,
        Endpoint::GenerateConversationTitle,
        Endpoint::InstructionStream,
        Endpoint::SmartPasteStream,
        Endpoint::GenerateCommitMessageStream,
        Endpoint::NextEditStream,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::GetModels => "/get-models",
            Endpoint::Completion => "/completion",
            Endpoint::ChatInputCompletion => "/chat-input-completion",
            Endpoint::Edit => "/edit",
            Endpoint::Chat => "/chat",
            Endpoint::NextEditLoc => "/next_edit_loc",
            Endpoint::ChatStream => "/chat-stream",
            Endpoint::PromptEnhancer => "/prompt-enhancer",
            Endpoint::GenerateConversationTitle => "/generate-conversation-title",
            Endpoint::InstructionStream => "/instruction-stream",
            Endpoint::SmartPasteStream => "/smart-paste-stream",
            Endpoint::GenerateCommitMessageStream => "/generate-commit-message-stream",
            Endpoint::NextEditStream => "/next-edit-stream",
        }
    }

    pub fn parse(raw: &str) -> Option<Endpoint> {
        let raw = raw.trim();
        Endpoint::ALL.into_iter().find(|e| e.as_str() == raw)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An externally-decided route for one call. Read-only to the gateway.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    /// Proxy to the official backend unchanged.
    Official,
    /// The endpoint is switched off by policy.
    Disabled,
    /// Answer through a user-supplied provider.
    Byok {
        provider: ProviderConfig,
        model: String,
        requested_model: String,
    },
}

/// The routing-policy decision function, supplied by the host.
pub trait RoutePolicy: Send + Sync {
    fn decide(
        &self,
        config: &Config,
        endpoint: &Endpoint,
        body: &Value,
        runtime_enabled: bool,
    ) -> Route;
}

/// Outcome of a dispatch attempt. `NotHandled` means the caller must fall
/// back to the official backend.
pub enum Dispatch<T> {
    Handled(T),
    NotHandled,
}

impl<T> std::fmt::Debug for Dispatch<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dispatch::Handled(_) => f.write_str("Handled(..)"),
            Dispatch::NotHandled => f.write_str("NotHandled"),
        }
    }
}

impl<T> Dispatch<T> {
    pub fn is_handled(&self) -> bool {
        matches!(self, Dispatch::Handled(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Dispatch::Handled(value) => Some(value),
            Dispatch::NotHandled => None,
        }
    }
}

/// The caller-supplied function converting an internal envelope into the
/// shape the original caller expects.
pub type Reshape = Arc<dyn Fn(Value) -> anyhow::Result<Value> + Send + Sync>;

/// A stream of reshaped results, delivered in provider order.
pub type ReshapedStream = BoxStream<'static, GatewayResult<Value>>;

fn apply_reshape<T: Serialize>(
    reshape: &Reshape,
    value: &T,
    endpoint: Endpoint,
) -> GatewayResult<Value> {
    let raw = serde_json::to_value(value).map_err(|err| GatewayError::Reshape {
        endpoint: endpoint.as_str().to_string(),
        source: anyhow::Error::new(err),
    })?;
    (reshape.as_ref())(raw).map_err(|source| GatewayError::Reshape {
        endpoint: endpoint.as_str().to_string(),
        source,
    })
}

fn resolve_timeout(config: &Config, requested: Option<Duration>) -> Duration {
    match requested {
        Some(t) if !t.is_zero() => t,
        _ => Duration::from_millis(config.timeouts.upstream_ms),
    }
}

/// The dispatch router. Collaborators are injected once at construction;
/// every call is otherwise stateless.
pub struct Gateway {
    config: Arc<dyn ConfigSource>,
    policy: Arc<dyn RoutePolicy>,
    openai: Arc<dyn OpenAiCompatAdapter>,
    anthropic: Arc<dyn AnthropicAdapter>,
    catalog: Arc<dyn OfficialModelCatalog>,
    summarizer: Arc<dyn HistorySummarizer>,
}

impl Gateway {
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::new()
    }

    /// Handle a one-shot endpoint call.
    ///
    /// Returns `NotHandled` for unrecognized endpoints, officially-routed
    /// calls, a disabled gateway runtime, and streaming-only endpoints.
    /// Fails on disabled routes and configuration errors.
    pub async fn handle(
        &self,
        endpoint: &str,
        body: &Value,
        reshape: Reshape,
        timeout: Option<Duration>,
        cancel: CancellationToken,
        upstream_token: Option<&str>,
    ) -> GatewayResult<Dispatch<Value>> {
        let Some(endpoint) = Endpoint::parse(endpoint) else {
            return Ok(Dispatch::NotHandled);
        };
        let config = self.config.get();
        if !self.config.runtime_enabled() {
            return Ok(Dispatch::NotHandled);
        }

        // Telemetry-disabled endpoints are answered with a stub before any
        // routing decision. A failing reshape downgrades to the official
        // fallback instead of surfacing.
        if config.is_telemetry_disabled(endpoint.as_str()) {
            return match apply_reshape(&reshape, &json!({}), endpoint) {
                Ok(value) => Ok(Dispatch::Handled(value)),
                Err(err) => {
                    warn!(endpoint = %endpoint, error = %err, "telemetry stub reshape failed, falling back to official");
                    Ok(Dispatch::NotHandled)
                }
            };
        }

        let route = self.policy.decide(&config, &endpoint, body, true);
        let (provider, model) = match route {
            Route::Official => return Ok(Dispatch::NotHandled),
            Route::Disabled => {
                return Err(GatewayError::RoutingDisabled {
                    endpoint: endpoint.as_str().to_string(),
                })
            }
            Route::Byok { provider, model, .. } => (provider, model),
        };
        let timeout = resolve_timeout(&config, timeout);

        match endpoint {
            Endpoint::GetModels => {
                let byok_models = build_byok_model_names(&config);
                let preferred = preferred_default_model(&config, &byok_models);
                let clamped = timeout.min(MODEL_LIST_TIMEOUT_CAP);
                let listing = match self
                    .catalog
                    .fetch_models(upstream_token, clamped, &cancel)
                    .await
                {
                    Ok(upstream) => merge_models(upstream, &byok_models, &preferred),
                    Err(err) => {
                        warn!(error = %format!("{err:#}"), "get-models falling back to local list");
                        serde_json::to_value(local_models_result(&byok_models, &preferred))
                            .unwrap_or(Value::Null)
                    }
                };
                apply_reshape(&reshape, &listing, endpoint).map(Dispatch::Handled)
            }
            Endpoint::Completion | Endpoint::ChatInputCompletion => {
                let (system, messages) = build_messages_for_endpoint(&endpoint, body);
                let text = self
                    .complete_text(&provider, &model, system, messages, timeout, cancel)
                    .await?;
                let result = CompletionResult {
                    text,
                    timeout_ms: timeout.as_millis() as u64,
                };
                apply_reshape(&reshape, &result, endpoint).map(Dispatch::Handled)
            }
            Endpoint::Edit => {
                let (system, messages) = build_messages_for_endpoint(&endpoint, body);
                let text = self
                    .complete_text(&provider, &model, system, messages, timeout, cancel)
                    .await?;
                apply_reshape(&reshape, &TextResult { text }, endpoint).map(Dispatch::Handled)
            }
            Endpoint::Chat => {
                let (system, messages) = build_messages_for_endpoint(&endpoint, body);
                let text = self
                    .complete_text(&provider, &model, system, messages, timeout, cancel)
                    .await?;
                apply_reshape(&reshape, &ChatResult::new(text), endpoint).map(Dispatch::Handled)
            }
            Endpoint::NextEditLoc => {
                let result = NextEditLocationResult {
                    candidate_locations: pick_next_edit_location_candidates(body),
                };
                apply_reshape(&reshape, &result, endpoint).map(Dispatch::Handled)
            }
            _ => Ok(Dispatch::NotHandled),
        }
    }

    /// Handle a streaming endpoint call. Chunks are reshaped one by one,
    /// in provider order, as they arrive.
    pub async fn handle_stream(
        &self,
        endpoint: &str,
        body: &Value,
        reshape: Reshape,
        timeout: Option<Duration>,
        cancel: CancellationToken,
    ) -> GatewayResult<Dispatch<ReshapedStream>> {
        let Some(endpoint) = Endpoint::parse(endpoint) else {
            return Ok(Dispatch::NotHandled);
        };
        let config = self.config.get();
        if !self.config.runtime_enabled() {
            return Ok(Dispatch::NotHandled);
        }

        let route = self.policy.decide(&config, &endpoint, body, true);
        let (provider, model, requested_model) = match route {
            Route::Official => return Ok(Dispatch::NotHandled),
            Route::Disabled => {
                return Err(GatewayError::RoutingDisabled {
                    endpoint: endpoint.as_str().to_string(),
                })
            }
            Route::Byok {
                provider,
                model,
                requested_model,
            } => (provider, model, requested_model),
        };
        let timeout = resolve_timeout(&config, timeout);

        if config.is_telemetry_disabled(endpoint.as_str()) {
            return Ok(Dispatch::Handled(tokio_stream::empty().boxed()));
        }

        match endpoint {
            Endpoint::ChatStream => Ok(Dispatch::Handled(self.chat_stream(
                config,
                provider,
                model,
                requested_model,
                body.clone(),
                reshape,
                timeout,
                cancel,
            ))),
            Endpoint::PromptEnhancer
            | Endpoint::GenerateConversationTitle
            | Endpoint::GenerateCommitMessageStream => {
                let (system, messages) = build_messages_for_endpoint(&endpoint, body);
                let deltas = self
                    .stream_text(&provider, &model, system, messages, timeout, cancel)
                    .await?;
                let stream = deltas
                    .map(move |delta| match delta {
                        Ok(text) => apply_reshape(&reshape, &ChatResult::new(text), endpoint),
                        Err(err) => Err(GatewayError::from(err)),
                    })
                    .boxed();
                Ok(Dispatch::Handled(stream))
            }
            Endpoint::InstructionStream | Endpoint::SmartPasteStream => {
                let (system, messages) = build_messages_for_endpoint(&endpoint, body);
                let deltas = self
                    .stream_text(&provider, &model, system, messages, timeout, cancel)
                    .await?;
                let stream = deltas
                    .map(move |delta| match delta {
                        Ok(text) => apply_reshape(&reshape, &json!({ "text": text }), endpoint),
                        Err(err) => Err(GatewayError::from(err)),
                    })
                    .boxed();
                Ok(Dispatch::Handled(stream))
            }
            Endpoint::NextEditStream => {
                let bounds = selection_bounds(body);
                let existing_code = string_of(pick(body, &["selected_text", "selectedText"]));
                let (system, messages) = build_messages_for_endpoint(&endpoint, body);
                let suggested_code = self
                    .complete_text(&provider, &model, system, messages, timeout, cancel)
                    .await?;
                let chunk = NextEditGenerationChunk {
                    path: string_of(pick(body, &["path"])).trim().to_string(),
                    blob_name: string_of(pick(body, &["blob_name", "blobName"]))
                        .trim()
                        .to_string(),
                    char_start: bounds.begin,
                    char_end: bounds.end,
                    existing_code,
                    suggested_code,
                };
                let value = apply_reshape(&reshape, &chunk, endpoint)?;
                Ok(Dispatch::Handled(tokio_stream::once(Ok(value)).boxed()))
            }
            _ => Ok(Dispatch::NotHandled),
        }
    }

    /// One-shot provider dispatch with per-family message shaping.
    async fn complete_text(
        &self,
        provider: &ProviderConfig,
        model: &str,
        system: String,
        messages: Vec<WireMessage>,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> GatewayResult<String> {
        let (kind, ctx) = provider_call_context(provider, model, timeout, cancel)?;
        match kind {
            ProviderKind::OpenAiCompat => Ok(self
                .openai
                .complete_text(ctx, as_openai_messages(&system, messages))
                .await?),
            ProviderKind::Anthropic => {
                let (system, messages) = as_anthropic_messages(&system, messages);
                Ok(self.anthropic.complete_text(ctx, system, messages).await?)
            }
        }
    }

    /// Streaming text-delta dispatch with per-family message shaping.
    async fn stream_text(
        &self,
        provider: &ProviderConfig,
        model: &str,
        system: String,
        messages: Vec<WireMessage>,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> GatewayResult<TextDeltaStream> {
        let (kind, ctx) = provider_call_context(provider, model, timeout, cancel)?;
        match kind {
            ProviderKind::OpenAiCompat => Ok(self
                .openai
                .stream_text_deltas(ctx, as_openai_messages(&system, messages))
                .await?),
            ProviderKind::Anthropic => {
                let (system, messages) = as_anthropic_messages(&system, messages);
                Ok(self
                    .anthropic
                    .stream_text_deltas(ctx, system, messages)
                    .await?)
            }
        }
    }

    /// The full chat stream: normalization (with compaction), the
    /// best-effort summarization call, translation, and per-chunk
    /// reshaping. All failures after stream construction surface as
    /// stream items so the caller sees them at pull time.
    #[allow(clippy::too_many_arguments)]
    fn chat_stream(
        &self,
        config: Arc<Config>,
        provider: ProviderConfig,
        model: String,
        requested_model: String,
        body: Value,
        reshape: Reshape,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> ReshapedStream {
        let openai = Arc::clone(&self.openai);
        let anthropic = Arc::clone(&self.anthropic);
        let summarizer = Arc::clone(&self.summarizer);
        Box::pin(async_stream::stream! {
            let endpoint = Endpoint::ChatStream;
            let mut request = normalize_chat_request(&body);

            // Nothing to say and nothing to send: end the turn without a
            // provider call.
            if request.is_empty_turn() {
                yield apply_reshape(&reshape, &ChatChunk::end_of_turn(), endpoint);
                return;
            }

            match summarizer
                .summarize_and_compact(SummaryContext {
                    config: config.as_ref(),
                    request: &mut request,
                    requested_model: &requested_model,
                    fallback_provider: &provider,
                    fallback_model: &model,
                    timeout,
                    cancel: cancel.clone(),
                })
                .await
            {
                Ok(SummaryOutcome::Applied) => debug!("history summary applied"),
                Ok(SummaryOutcome::Skipped(reason)) => {
                    debug!(reason = %reason, "history summary skipped")
                }
                Err(err) => {
                    warn!(error = %format!("{err:#}"), "history summary failed (ignored)")
                }
            }

            let tool_meta = build_tool_meta_by_name(&request.tool_definitions);
            let support_tool_use_start = request.supports_tool_use_start();
            let (kind, ctx) = match provider_call_context(&provider, &model, timeout, cancel.clone())
            {
                Ok(v) => v,
                Err(err) => {
                    yield Err(err);
                    return;
                }
            };
            let upstream = match kind {
                ProviderKind::OpenAiCompat => {
                    let call = OpenAiChatCall {
                        messages: build_openai_chat_messages(&request),
                        tools: convert_openai_tools(&request.tool_definitions),
                        tool_meta,
                        support_tool_use_start,
                    };
                    openai.chat_stream(ctx, call).await
                }
                ProviderKind::Anthropic => {
                    let call = AnthropicChatCall {
                        system: build_system_prompt(&request),
                        messages: build_anthropic_chat_messages(&request),
                        tools: convert_anthropic_tools(&request.tool_definitions),
                        tool_meta,
                        support_tool_use_start,
                    };
                    anthropic.chat_stream(ctx, call).await
                }
            };
            let mut upstream = match upstream {
                Ok(stream) => stream,
                Err(err) => {
                    yield Err(GatewayError::from(err));
                    return;
                }
            };
            while let Some(item) = upstream.next().await {
                match item {
                    Ok(chunk) => yield apply_reshape(&reshape, &chunk, endpoint),
                    Err(err) => yield Err(GatewayError::from(err)),
                }
            }
        })
    }
}

/// Builder for a `Gateway`.
pub struct GatewayBuilder {
    config: Option<Arc<dyn ConfigSource>>,
    policy: Option<Arc<dyn RoutePolicy>>,
    openai: Option<Arc<dyn OpenAiCompatAdapter>>,
    anthropic: Option<Arc<dyn AnthropicAdapter>>,
    catalog: Option<Arc<dyn OfficialModelCatalog>>,
    summarizer: Arc<dyn HistorySummarizer>,
}

impl GatewayBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            policy: None,
            openai: None,
            anthropic: None,
            catalog: None,
            summarizer: Arc::new(NoopSummarizer),
        }
    }

    pub fn config(mut self, config: Arc<dyn ConfigSource>) -> Self {
        self.config = Some(config);
        self
    }

    pub fn policy(mut self, policy: Arc<dyn RoutePolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn openai_adapter(mut self, adapter: Arc<dyn OpenAiCompatAdapter>) -> Self {
        self.openai = Some(adapter);
        self
    }

    pub fn anthropic_adapter(mut self, adapter: Arc<dyn AnthropicAdapter>) -> Self {
        self.anthropic = Some(adapter);
        self
    }

    pub fn model_catalog(mut self, catalog: Arc<dyn OfficialModelCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn summarizer(mut self, summarizer: Arc<dyn HistorySummarizer>) -> Self {
        self.summarizer = summarizer;
        self
    }

    pub fn build(self) -> Result<Gateway, String> {
        Ok(Gateway {
            config: self.config.ok_or_else(|| "config source required".to_string())?,
            policy: self.policy.ok_or_else(|| "route policy required".to_string())?,
            openai: self.openai.ok_or_else(|| "openai adapter required".to_string())?,
            anthropic: self
                .anthropic
                .ok_or_else(|| "anthropic adapter required".to_string())?,
            catalog: self
                .catalog
                .ok_or_else(|| "model catalog required".to_string())?,
            summarizer: self.summarizer,
        })
    }
}

impl Default for GatewayBuilder {
    fn default() -> Self {
        Self::new()
    }
}
