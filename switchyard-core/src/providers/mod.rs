//! Provider abstraction layer
//!
//! Adapter contracts for the two supported provider families, the
//! per-family message shaping applied before each call, and the builders
//! that flatten normalized requests into provider-bound message lists.

pub mod adapter;
pub mod error;
pub mod messages;

pub use adapter::{
    as_anthropic_messages, as_openai_messages, provider_call_context, AnthropicAdapter,
    AnthropicChatCall, CallContext, ChatChunkStream, OpenAiChatCall, OpenAiCompatAdapter,
    ProviderKind, TextDeltaStream, WireMessage, WireRole,
};
pub use error::{AdapterError, ProviderResult};
pub use messages::{
    build_anthropic_chat_messages, build_messages_for_endpoint, build_openai_chat_messages,
};
