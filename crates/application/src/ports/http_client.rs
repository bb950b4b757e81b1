//! HTTP client port

use async_trait::async_trait;
use quiver_domain::{RequestSpec, ResponseSpec};
use thiserror::Error;

/// Errors surfaced by the HTTP transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HttpClientError {
    /// The assembled URL was rejected by the transport.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request exceeded the fixed timeout.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// The configured timeout in milliseconds.
        timeout_ms: u64,
    },

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The invocation was cancelled (e.g. Ctrl-C) while in flight.
    #[error("request cancelled")]
    Cancelled,

    /// Any other transport failure.
    #[error("http error: {0}")]
    Other(String),
}

/// Port for executing one HTTP request.
///
/// The application layer issues exactly one call per invocation: no
/// retries, no batching. The implementation bounds the call with a
/// fixed timeout; cancellation is raced by the caller and must abort
/// the in-flight call, surfacing as an error rather than a partial
/// response.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Executes the request and returns the observed response.
    ///
    /// # Errors
    ///
    /// Returns an `HttpClientError` for transport failures, timeouts,
    /// and cancellation.
    async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, HttpClientError>;
}
