//! Response cache port

use async_trait::async_trait;
use quiver_domain::{Hit, Scalar};
use thiserror::Error;

/// Errors surfaced by the response cache.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// No response has been recorded for the referenced request ID.
    #[error("no cached response for request '@{0}'")]
    RequestIdNotFound(String),

    /// The dotted path does not exist in the cached response.
    #[error("key not found: '{0}'")]
    PathNotFound(String),

    /// The dotted path names a JSON object or array where a scalar is
    /// required.
    #[error("found json, expected a string, number or boolean for key '{0}'")]
    NotAScalar(String),

    /// A JSON-content-typed response carried a body that is not JSON.
    #[error("response for '@{id}' is not valid JSON: {message}")]
    InvalidJsonBody {
        /// Request ID whose response failed to parse.
        id: String,
        /// Parser diagnostic.
        message: String,
    },

    /// The underlying store failed.
    #[error("cache storage error: {0}")]
    Storage(String),
}

/// Port for the persisted request/response cache.
///
/// The cache keeps at most one record per request ID — the most recent
/// exchange — and only JSON response bodies are queryable. Reads happen
/// during reference resolution; the single write happens after a
/// successful response. Concurrent invocations writing the same ID race
/// last-write-wins; that limitation is accepted, not worked around.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Resolves a dotted path (`requestID.field…`) into the most recent
    /// cached JSON response for that request ID and returns the typed
    /// scalar found there.
    ///
    /// # Errors
    ///
    /// `RequestIdNotFound` when nothing is cached under the leading
    /// segment, `PathNotFound` when the remaining path does not exist
    /// (JSON `null` counts as absent), `NotAScalar` when the path lands
    /// on an object or array.
    fn get(&self, path: &str) -> Result<Scalar, CacheError>;

    /// Records an exchange, replacing any prior record for the same
    /// request ID. Responses without a JSON content type are silently
    /// not cached.
    ///
    /// # Errors
    ///
    /// `InvalidJsonBody` when a JSON-content-typed body fails to parse.
    fn save(&mut self, hit: Hit) -> Result<(), CacheError>;

    /// Persists buffered state. Called once before process exit.
    ///
    /// # Errors
    ///
    /// `Storage` when the underlying store cannot be written.
    async fn flush(&self) -> Result<(), CacheError>;
}
