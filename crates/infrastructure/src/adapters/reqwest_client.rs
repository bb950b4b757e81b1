//! HTTP client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port. One invocation issues
//! exactly one call, bounded by a fixed timeout; redirects are not
//! followed, so the recorded response is always the direct answer of
//! the endpoint the request addressed.

use std::time::Duration;

use async_trait::async_trait;
use quiver_application::ports::http_client::{HttpClient, HttpClientError};
use quiver_domain::{Header, RequestSpec, ResponseSpec};
use reqwest::{Client, Method, Url, redirect};

/// Fixed bound on a single request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client implementation using reqwest.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Creates a client with quiver's transport policy: no redirect
    /// following and a 10-second request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be constructed.
    pub fn new() -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;
        Ok(Self { client })
    }

    /// Creates the adapter around an already configured reqwest client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Maps reqwest errors into the port's error type.
    fn map_error(error: &reqwest::Error) -> HttpClientError {
        if error.is_timeout() {
            return HttpClientError::Timeout {
                timeout_ms: u64::try_from(REQUEST_TIMEOUT.as_millis()).unwrap_or(u64::MAX),
            };
        }
        if error.is_connect() {
            return HttpClientError::ConnectionFailed(error.to_string());
        }
        HttpClientError::Other(error.to_string())
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, HttpClientError> {
        let url = Url::parse(&request.full_url())
            .map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {}", request.full_url())))?;
        let method = Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        tracing::debug!(method = %method, url = %url, "sending request");

        let mut builder = self.client.request(method, url);
        for header in &request.headers {
            builder = builder.header(&header.name, &header.value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|e| Self::map_error(&e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| Header::new(name.as_str(), value.to_str().unwrap_or("<binary>")))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| Self::map_error(&e))?
            .to_vec();

        Ok(ResponseSpec::new(status, headers, body))
    }
}
