//! Switchyard Core Library
//!
//! A chat-protocol gateway: normalizes the host's node-based chat
//! representation, bounds conversation growth through in-band history
//! compaction, and dispatches each endpoint to an OpenAI-compatible or
//! Anthropic provider adapter, reshaping one-shot and streamed replies
//! back into the host's envelopes.
//!
//! Routing decisions, HTTP transport, SSE parsing, configuration loading
//! and the summary producer are host concerns, consumed here through the
//! traits in [`config`], [`router`], [`providers`] and [`history`].

pub mod config;
pub mod error;
pub mod extract;
pub mod history;
pub mod prompt;
pub mod protocol;
pub mod providers;
pub mod router;
pub mod tools;

pub use error::{GatewayError, GatewayResult};
pub use router::{Dispatch, Endpoint, Gateway, GatewayBuilder, Reshape, ReshapedStream, Route, RoutePolicy};

/// Returns the version of the Switchyard Core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
