//! Provider adapter error types

use thiserror::Error;

/// Result type for provider adapter operations.
pub type ProviderResult<T> = Result<T, AdapterError>;

/// Errors an adapter can report. Transport details stay inside the
/// adapter; the gateway only needs enough shape to classify failures.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(String),

    /// The call exceeded its timeout.
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// The provider returned an error response.
    #[error("Upstream error {code}: {message}")]
    Upstream { code: String, message: String },

    /// The provider's response could not be parsed.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The call was cancelled cooperatively.
    #[error("Request cancelled")]
    Cancelled,

    /// Anything else.
    #[error("{0}")]
    Other(String),
}
