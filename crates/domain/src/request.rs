//! Resolved, wire-ready request description.

use std::fmt;

use crate::method::Method;

/// A single HTTP header.
///
/// Order-preserving; names are compared case-insensitively wherever
/// headers are merged or looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Header name as written.
    pub name: String,
    /// Header value.
    pub value: String,
}

impl Header {
    /// Creates a header from name and value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns whether this header has the given name, ignoring case.
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// A fully resolved outbound request.
///
/// Created fresh per invocation by the request builder, consumed by the
/// HTTP adapter, then discarded. `body: None` means no body is sent at
/// all, which is distinct from sending an empty body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    /// HTTP method.
    pub method: Method,
    /// URL scheme, `http` or `https`.
    pub scheme: String,
    /// URL authority, `host` or `host:port`.
    pub host: String,
    /// Percent-escaped, reference-resolved path.
    pub path: String,
    /// Canonically encoded query string, empty when there is none.
    pub query_string: String,
    /// Merged headers, in insertion order.
    pub headers: Vec<Header>,
    /// Resolved body bytes, or `None` when the definition has no body.
    pub body: Option<Vec<u8>>,
}

impl RequestSpec {
    /// Assembles the complete URL for this request.
    #[must_use]
    pub fn full_url(&self) -> String {
        if self.query_string.is_empty() {
            format!("{}://{}{}", self.scheme, self.host, self.path)
        } else {
            format!(
                "{}://{}{}?{}",
                self.scheme, self.host, self.path, self.query_string
            )
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
}
