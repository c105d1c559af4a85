//! Upstream failure taxonomy
//!
//! Every network step returns `Result<_, UpstreamError>` internally. The
//! public engine and enrichment operations log these and degrade to an
//! empty or absent result; none of them escape to callers.

use thiserror::Error;

/// Upstream call errors
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection, TLS or timeout failure
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("Upstream returned HTTP {0}")]
    Status(u16),

    /// Explicit throttling signal (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Body was not JSON or had no recognizable shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Caller cancelled the operation
    #[error("Cancelled")]
    Cancelled,
}

impl UpstreamError {
    /// True for the explicit throttling signal
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, UpstreamError::RateLimited)
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        UpstreamError::Network(err.to_string())
    }
}

/// Result type for upstream calls
pub type UpstreamResult<T> = Result<T, UpstreamError>;
