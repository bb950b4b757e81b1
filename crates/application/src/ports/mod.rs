//! Ports: trait boundaries to the infrastructure ring.

pub mod cache;
pub mod http_client;

pub use cache::{CacheError, ResponseCache};
pub use http_client::{HttpClient, HttpClientError};
