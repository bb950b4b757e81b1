//! Run Request use case: one invocation end-to-end.
//!
//! Finds the definition, builds the resolved request, executes it once
//! through the HTTP port (raced against cancellation), records the
//! exchange in the cache, and hands the response back for printing.
//! Flushing the cache is the binary's responsibility, once, at exit.

use std::future::{Future, pending};
use std::sync::Arc;

use chrono::Utc;
use quiver_domain::{Hit, ResponseSpec};
use thiserror::Error;

use crate::builder::{BuildError, build_request};
use crate::catalog::RequestCatalog;
use crate::globals::Globals;
use crate::ports::cache::{CacheError, ResponseCache};
use crate::ports::http_client::{HttpClient, HttpClientError};

/// Errors from a single invocation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunError {
    /// No definition carries the requested ID.
    #[error("request '@{0}' not found")]
    RequestNotFound(String),

    /// The request could not be built.
    #[error("failed to build request: {0}")]
    Build(#[from] BuildError),

    /// The HTTP call failed, timed out, or was cancelled.
    #[error(transparent)]
    Http(#[from] HttpClientError),

    /// The exchange could not be recorded.
    #[error("saving response: {0}")]
    Cache(#[from] CacheError),
}

/// Use case for resolving and firing one named request.
///
/// Owns the cache for the duration of the invocation; the HTTP client
/// is shared behind an `Arc`. Errors are terminal — nothing is retried
/// and no partial result is ever produced.
pub struct RunRequest<H, C> {
    http: Arc<H>,
    cache: C,
}

impl<H: HttpClient, C: ResponseCache> RunRequest<H, C> {
    /// Creates the use case from its collaborators.
    pub const fn new(http: Arc<H>, cache: C) -> Self {
        Self { http, cache }
    }

    /// Runs the request named `id`, never cancelling.
    ///
    /// # Errors
    ///
    /// See [`RunError`].
    pub async fn run(
        &mut self,
        catalog: &RequestCatalog,
        globals: &Globals,
        id: &str,
        args: &[String],
    ) -> Result<ResponseSpec, RunError> {
        self.run_until(catalog, globals, id, args, pending()).await
    }

    /// Runs the request named `id`, aborting with
    /// `HttpClientError::Cancelled` if `cancel` completes while the call
    /// is in flight.
    ///
    /// # Errors
    ///
    /// See [`RunError`].
    pub async fn run_until(
        &mut self,
        catalog: &RequestCatalog,
        globals: &Globals,
        id: &str,
        args: &[String],
        cancel: impl Future<Output = ()> + Send,
    ) -> Result<ResponseSpec, RunError> {
        let def = catalog
            .find(id)
            .ok_or_else(|| RunError::RequestNotFound(id.to_string()))?;

        let spec = build_request(def, globals, args, &self.cache)?;

        let response = tokio::select! {
            result = self.http.execute(&spec) => result?,
            () = cancel => return Err(RunError::Http(HttpClientError::Cancelled)),
        };

        let hit = Hit::from_exchange(id, &spec, &response, Utc::now());
        self.cache.save(hit)?;

        Ok(response)
    }

    /// Flushes the cache. Call once, after the last invocation.
    ///
    /// # Errors
    ///
    /// Propagates `CacheError::Storage` from the underlying store.
    pub async fn finish(&self) -> Result<(), CacheError> {
        self.cache.flush().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use quiver_domain::{GlobalSection, Header, HitFile, Method, RequestDef, RequestSpec, Scalar};
    use std::sync::Mutex;
    use url::Url;

    struct MockHttpClient {
        response: Result<ResponseSpec, HttpClientError>,
        seen: Mutex<Vec<RequestSpec>>,
    }

    impl MockHttpClient {
        fn success(status: u16, body: &[u8]) -> Self {
            Self {
                response: Ok(ResponseSpec::new(
                    status,
                    vec![Header::new("content-type", "application/json")],
                    body.to_vec(),
                )),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(error: HttpClientError) -> Self {
            Self {
                response: Err(error),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, HttpClientError> {
            self.seen.lock().unwrap().push(request.clone());
            self.response.clone()
        }
    }

    #[derive(Default)]
    struct MemoryCache {
        hits: Vec<Hit>,
    }

    #[async_trait]
    impl ResponseCache for MemoryCache {
        fn get(&self, path: &str) -> Result<Scalar, CacheError> {
            Err(CacheError::PathNotFound(path.to_string()))
        }

        fn save(&mut self, hit: Hit) -> Result<(), CacheError> {
            self.hits.push(hit);
            Ok(())
        }

        async fn flush(&self) -> Result<(), CacheError> {
            Ok(())
        }
    }

    fn fixtures() -> (RequestCatalog, Globals) {
        let file = HitFile {
            global: GlobalSection::default(),
            requests: vec![RequestDef {
                id: "ping".to_string(),
                method: Method::new("get").unwrap(),
                path: "/ping".to_string(),
                headers: Vec::new(),
                body: None,
            }],
        };
        let catalog = RequestCatalog::from_files(std::slice::from_ref(&file)).unwrap();
        let globals = Globals {
            base_url: Url::parse("https://example.com").unwrap(),
            headers: std::collections::BTreeMap::new(),
        };
        (catalog, globals)
    }

    fn prog_args() -> Vec<String> {
        vec!["prog".to_string()]
    }

    #[tokio::test]
    async fn runs_and_records_the_exchange() {
        let (catalog, globals) = fixtures();
        let http = Arc::new(MockHttpClient::success(200, b"{\"ok\":true}"));
        let mut use_case = RunRequest::new(Arc::clone(&http), MemoryCache::default());

        let response = use_case
            .run(&catalog, &globals, "ping", &prog_args())
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        let sent = http.seen.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].full_url(), "https://example.com/ping");
        assert_eq!(use_case.cache.hits.len(), 1);
        assert_eq!(use_case.cache.hits[0].request_id, "ping");
        assert_eq!(use_case.cache.hits[0].response.status, 200);
    }

    #[tokio::test]
    async fn unknown_id_fails_before_any_call() {
        let (catalog, globals) = fixtures();
        let http = Arc::new(MockHttpClient::success(200, b"{}"));
        let mut use_case = RunRequest::new(Arc::clone(&http), MemoryCache::default());

        let err = use_case
            .run(&catalog, &globals, "missing", &prog_args())
            .await
            .unwrap_err();

        assert_eq!(err, RunError::RequestNotFound("missing".to_string()));
        assert!(http.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn http_errors_propagate_without_caching() {
        let (catalog, globals) = fixtures();
        let http = Arc::new(MockHttpClient::failing(HttpClientError::Timeout {
            timeout_ms: 10_000,
        }));
        let mut use_case = RunRequest::new(http, MemoryCache::default());

        let err = use_case
            .run(&catalog, &globals, "ping", &prog_args())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RunError::Http(HttpClientError::Timeout { timeout_ms: 10_000 })
        ));
        assert!(use_case.cache.hits.is_empty());
    }

    #[tokio::test]
    async fn cancellation_aborts_the_call() {
        let (catalog, globals) = fixtures();

        /// A client that never completes, standing in for a hung server.
        struct HangingClient;

        #[async_trait]
        impl HttpClient for HangingClient {
            async fn execute(
                &self,
                _request: &RequestSpec,
            ) -> Result<ResponseSpec, HttpClientError> {
                pending().await
            }
        }

        let mut use_case = RunRequest::new(Arc::new(HangingClient), MemoryCache::default());
        let err = use_case
            .run_until(&catalog, &globals, "ping", &prog_args(), async {})
            .await
            .unwrap_err();

        assert_eq!(err, RunError::Http(HttpClientError::Cancelled));
        assert!(use_case.cache.hits.is_empty());
    }
}
