//! HTTP method token

use std::fmt;
use std::str::FromStr;

use crate::error::{DomainError, DomainResult};

/// A validated HTTP method token.
///
/// The definition grammar allows any run of ASCII letters as a method, so
/// this is a normalized newtype rather than a closed enum: `get`, `GET`
/// and `Purge` are all accepted and stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Method(String);

impl Method {
    /// Validates and normalizes a method token to uppercase.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidMethod` if the token is empty or
    /// contains anything other than ASCII letters.
    pub fn new(token: &str) -> DomainResult<Self> {
        if token.is_empty() || !token.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidMethod(token.to_string()));
        }
        Ok(Self(token.to_ascii_uppercase()))
    }

    /// Returns the method as an uppercase string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Method {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        Self::new(s)
    }
}
