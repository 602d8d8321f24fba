//! Search engine client trait definition.

use async_trait::async_trait;

use crate::errors::SearchClientError;

/// Abstracts the HTTP client used to write documents to the search engine.
///
/// Each method performs exactly one request against the given document URL and
/// returns the response status code. Implementations must not retry and must
/// not treat non-2xx statuses as errors: deciding whether a status means the
/// document was written is the caller's job.
///
/// # Errors
///
/// `Err(SearchClientError)` is reserved for requests that did not complete,
/// such as connection failures, timeouts or a failed token exchange.
#[async_trait]
pub trait SearchEngineClient: Send + Sync {
    /// Create a document at `url` with the given body and request headers.
    async fn post(
        &self,
        url: &str,
        body: String,
        headers: &[(&str, &str)],
    ) -> Result<u16, SearchClientError>;

    /// Replace the document at `url` with the given body and request headers.
    async fn put(
        &self,
        url: &str,
        body: String,
        headers: &[(&str, &str)],
    ) -> Result<u16, SearchClientError>;

    /// Delete the document at `url`. No body is sent.
    async fn delete(&self, url: &str) -> Result<u16, SearchClientError>;
}
