//! Error types for the Sleeper client

use thiserror::Error;

/// Result type for Sleeper client operations
pub type Result<T> = std::result::Result<T, UpstreamError>;

/// Errors surfaced by upstream access. None of them are retried by the client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("Upstream unavailable for {endpoint}: {reason}")]
    Unavailable { endpoint: String, reason: String },

    #[error("Upstream request for {endpoint} timed out after {timeout_secs}s")]
    Timeout { endpoint: String, timeout_secs: u64 },

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl UpstreamError {
    /// Endpoint the failed request was for, if any
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            UpstreamError::Unavailable { endpoint, .. } | UpstreamError::Timeout { endpoint, .. } => {
                Some(endpoint)
            }
            UpstreamError::Config(_) => None,
        }
    }

    /// Transport-level failure (unavailable or timed out)
    pub fn is_transport(&self) -> bool {
        !matches!(self, UpstreamError::Config(_))
    }
}
