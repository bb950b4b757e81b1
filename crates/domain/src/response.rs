//! Wire response description.

use crate::request::Header;

/// An HTTP response as observed on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSpec {
    /// Status code.
    pub status: u16,
    /// Response headers in wire order.
    pub headers: Vec<Header>,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl ResponseSpec {
    /// Creates a response from its parts.
    #[must_use]
    pub const fn new(status: u16, headers: Vec<Header>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Returns the first header value with the given name, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.is_named(name))
            .map(|h| h.value.as_str())
    }

    /// Returns whether the response declares a JSON content type.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.header("content-type")
            .is_some_and(|ct| ct.contains("application/json"))
    }
}
