//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The HTTP method token is not one or more ASCII letters.
    #[error("invalid HTTP method: '{0}'")]
    InvalidMethod(String),

    /// The request identifier does not match the identifier grammar.
    #[error("invalid request id: '{0}'")]
    InvalidRequestId(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
