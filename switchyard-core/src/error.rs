//! Gateway error taxonomy
//!
//! Only configuration and routing-disabled errors are meant to reach the
//! caller as failures; every other failure mode degrades to a fallback
//! response or to the not-handled sentinel before it gets here.

use thiserror::Error;

use crate::providers::error::AdapterError;

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Bad or missing provider configuration (including a missing API key).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The endpoint is explicitly disabled by routing policy.
    #[error("Routing disabled for endpoint: {endpoint}")]
    RoutingDisabled { endpoint: String },

    /// A provider type the gateway has no adapter for.
    #[error("Unknown provider type: {0}")]
    UnknownProviderType(String),

    /// An upstream provider call failed on a path with no local fallback.
    #[error("Provider call failed: {0}")]
    Provider(#[from] AdapterError),

    /// The caller-supplied reshape function failed.
    #[error("Reshape failed for {endpoint}: {source}")]
    Reshape {
        endpoint: String,
        #[source]
        source: anyhow::Error,
    },
}
