//! The persisted request/response record.

use chrono::{DateTime, Utc};

use crate::request::{Header, RequestSpec};
use crate::response::ResponseSpec;

/// The request half of a hit, flattened from the resolved spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitRequest {
    /// HTTP method as sent.
    pub method: String,
    /// URL authority.
    pub host: String,
    /// Resolved path.
    pub path: String,
    /// Resolved query string, empty when absent.
    pub query_string: String,
    /// Headers as sent.
    pub headers: Vec<Header>,
    /// Body bytes as sent, if any.
    pub body: Option<Vec<u8>>,
}

/// The response half of a hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitResponse {
    /// Status code.
    pub status: u16,
    /// Response headers.
    pub headers: Vec<Header>,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

/// One executed request/response exchange, keyed by request ID.
///
/// The cache collaborator stores at most one hit per request ID — the
/// most recent one — and only its JSON response body is queryable by
/// reference resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    /// Definition ID this exchange belongs to.
    pub request_id: String,
    /// When the exchange completed.
    pub created_at: DateTime<Utc>,
    /// The request as sent.
    pub request: HitRequest,
    /// The response as received.
    pub response: HitResponse,
}

impl Hit {
    /// Builds a hit record from a completed exchange.
    #[must_use]
    pub fn from_exchange(
        request_id: impl Into<String>,
        request: &RequestSpec,
        response: &ResponseSpec,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            created_at: at,
            request: HitRequest {
                method: request.method.as_str().to_string(),
                host: request.host.clone(),
                path: request.path.clone(),
                query_string: request.query_string.clone(),
                headers: request.headers.clone(),
                body: request.body.clone(),
            },
            response: HitResponse {
                status: response.status,
                headers: response.headers.clone(),
                body: response.body.clone(),
            },
        }
    }

    /// Returns whether the recorded response declares a JSON content type.
    #[must_use]
    pub fn has_json_response(&self) -> bool {
        self.response
            .headers
            .iter()
            .find(|h| h.is_named("content-type"))
            .is_some_and(|h| h.value.contains("application/json"))
    }
}
