//! Typed errors for provider HTTP calls
//!
//! These cover the transport only. An HTTP response with a non-2xx status is
//! not an error at this level; it becomes an `api_error` outcome.

use thiserror::Error;

/// Transport-level failures with typed variants
///
/// - `Timeout` - the per-provider deadline elapsed
/// - `Network` - connection refused, DNS, TLS, reset
/// - `Decode` - the body could not be read
/// - `Other` - catch-all for unhandled errors
#[derive(Debug, Error)]
pub enum LlmError {
    /// Request exceeded its deadline
    #[error("Request timed out")]
    Timeout,

    /// Network connectivity issue
    #[error("Network error: {0}")]
    Network(String),

    /// Response body could not be read or decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Other errors not fitting the above categories
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl LlmError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, LlmError::Timeout)
    }

    /// Convert network/connection errors into typed LlmError
    pub fn from_network_error(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else if e.is_connect() {
            LlmError::Network(format!("Connection failed: {}", e))
        } else if e.is_decode() || e.is_body() {
            LlmError::Decode(e.to_string())
        } else if e.is_request() {
            LlmError::Network(e.to_string())
        } else {
            LlmError::Other(e.into())
        }
    }
}
