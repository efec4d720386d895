//! Protocol module for the host's node-based chat representation
//!
//! Defines the canonical data models the gateway translates between: the
//! loosely-typed input layer, the typed node unions, normalized requests,
//! and the response envelopes handed back to the caller. These structures
//! are designed to be:
//! - Tolerant of every historical field spelling the host has shipped
//! - Total under malformed input (safe defaults, never errors)
//! - Explicit about unrecognized node tags

pub mod envelope;
pub mod loose;
pub mod nodes;
pub mod request;
pub mod tags;

pub use envelope::{
    ChatChunk, ChatResult, CompletionResult, GetModelsResult, ModelInfo, NextEditGenerationChunk,
    NextEditLocation, NextEditLocationResult, OutputNode, TextResult, ThinkingOut,
};
pub use nodes::{
    ExchangeSource, HistorySummaryNode, RequestNode, RequestNodeKind, ResponseNode,
    ResponseNodeKind, ToolResultNode, ToolUse,
};
pub use request::{normalize_chat_request, ChatHistoryItem, ChatRequest};
