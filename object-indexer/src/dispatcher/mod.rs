//! Dispatcher module for the object indexer.
//!
//! Mirrors a single storage event into the search index and classifies the
//! outcome into an acknowledge or retry decision.

use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::errors::DispatchError;
use crate::processor::parse_identity;
use object_indexer_repository::{document_address, SearchEngineClient};
use object_indexer_shared::{HttpMethod, StorageEvent};

/// Request headers sent with document bodies.
const JSON_HEADERS: &[(&str, &str)] = &[("Content-Type", "application/json")];

/// Outcome of dispatching one event.
///
/// `message` is empty on success and holds the failure reason otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    pub message: String,
    pub success: bool,
}

impl DispatchResult {
    /// A successful dispatch.
    pub fn ok() -> Self {
        Self {
            message: String::new(),
            success: true,
        }
    }

    /// A failed dispatch with the given reason.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
        }
    }
}

impl From<Result<(), DispatchError>> for DispatchResult {
    fn from(result: Result<(), DispatchError>) -> Self {
        match result {
            Ok(()) => Self::ok(),
            Err(e) => Self::failed(e.to_string()),
        }
    }
}

/// Dispatcher that writes storage events to the search engine.
///
/// The dispatcher is responsible for:
/// - Parsing the object identity out of the event
/// - Choosing the request for the event's method (create, replace, delete)
/// - Classifying the response status
///
/// It makes at most one request per event and never retries; a failed event
/// is left on the queue by the caller and retried on redelivery.
///
/// # Deletes of missing documents
///
/// A `404` answer to a delete counts as success: with duplicate deliveries the
/// document may already be gone, or may never have been indexed. This also
/// hides a delete that targeted the wrong document.
pub struct Dispatcher {
    client: Arc<dyn SearchEngineClient>,
    base_url: String,
}

impl Dispatcher {
    /// Create a new dispatcher writing documents under `base_url`.
    pub fn new(client: Arc<dyn SearchEngineClient>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// The base URL documents are written under.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Dispatch an event and collapse the outcome into a `DispatchResult`.
    pub async fn dispatch(&self, event: &StorageEvent) -> DispatchResult {
        self.try_dispatch(event).await.into()
    }

    /// Dispatch an event to the search engine.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The document was written, or deleted, or was already absent
    /// * `Err(DispatchError)` - The event must stay on the queue
    #[instrument(skip(self, event), fields(http_method = %event.http_method))]
    pub async fn try_dispatch(&self, event: &StorageEvent) -> Result<(), DispatchError> {
        let identity = parse_identity(event).map_err(|e| {
            error!(error = %e, "Failed to extract object info from event");
            DispatchError::InvalidObjectInfo(e)
        })?;

        let url = document_address(&self.base_url, &identity);

        let method = event
            .method()
            .ok_or_else(|| DispatchError::InvalidHttpMethod(event.http_method.clone()))?;

        let response = match method {
            HttpMethod::Post | HttpMethod::Put => {
                let body = serde_json::to_string(&identity)
                    .map_err(|e| DispatchError::Serialization(e.to_string()))?;

                info!(method = %method, url = %url, body = %body, "Sending document to search engine");

                if method == HttpMethod::Post {
                    self.client.post(&url, body, JSON_HEADERS).await
                } else {
                    self.client.put(&url, body, JSON_HEADERS).await
                }
            }
            HttpMethod::Delete => {
                info!(method = %method, url = %url, "Deleting document from search engine");
                self.client.delete(&url).await
            }
        };

        let status = response.map_err(|source| {
            error!(method = %method, url = %url, error = %source, "Search engine request failed");
            DispatchError::Transport { method, source }
        })?;

        if !is_accepted(method, status) {
            error!(method = %method, url = %url, status = status, "Search engine rejected document");
            return Err(DispatchError::RejectedByIndex { method, status });
        }

        debug!(method = %method, url = %url, status = status, "Document dispatched");
        Ok(())
    }
}

/// Whether `status` confirms that `method` took effect.
fn is_accepted(method: HttpMethod, status: u16) -> bool {
    matches!(status, 200 | 201) || (method == HttpMethod::Delete && status == 404)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use object_indexer_repository::SearchClientError;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    const BASE: &str = "http://search.local/objects/object";

    #[derive(Debug, Clone, PartialEq)]
    struct Call {
        method: &'static str,
        url: String,
        body: Option<String>,
        headers: Vec<(String, String)>,
    }

    /// Mock search client answering every request with a fixed outcome.
    struct MockSearchClient {
        response: Result<u16, SearchClientError>,
        calls: Mutex<Vec<Call>>,
    }

    impl MockSearchClient {
        fn with_status(status: u16) -> Self {
            Self {
                response: Ok(status),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                response: Err(SearchClientError::transport("connection refused")),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(
            &self,
            method: &'static str,
            url: &str,
            body: Option<String>,
            headers: &[(&str, &str)],
        ) -> Result<u16, SearchClientError> {
            self.calls.lock().unwrap().push(Call {
                method,
                url: url.to_string(),
                body,
                headers: headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            });
            self.response.clone()
        }
    }

    #[async_trait]
    impl SearchEngineClient for MockSearchClient {
        async fn post(
            &self,
            url: &str,
            body: String,
            headers: &[(&str, &str)],
        ) -> Result<u16, SearchClientError> {
            self.record("POST", url, Some(body), headers)
        }

        async fn put(
            &self,
            url: &str,
            body: String,
            headers: &[(&str, &str)],
        ) -> Result<u16, SearchClientError> {
            self.record("PUT", url, Some(body), headers)
        }

        async fn delete(&self, url: &str) -> Result<u16, SearchClientError> {
            self.record("DELETE", url, None, &[])
        }
    }

    fn dispatcher(client: &Arc<MockSearchClient>) -> Dispatcher {
        Dispatcher::new(client.clone(), BASE)
    }

    fn event(method: &str) -> StorageEvent {
        StorageEvent::new(method, "/v1/AUTH_acc/photos/2024/cat.png")
            .with_headers(json!({"Content-Length": "42"}).as_object().cloned().unwrap())
            .with_timestamp("1700000000.00000")
    }

    #[tokio::test]
    async fn test_post_success_statuses() {
        for status in [200, 201] {
            let client = Arc::new(MockSearchClient::with_status(status));
            let result = dispatcher(&client).dispatch(&event("POST")).await;
            assert_eq!(result, DispatchResult::ok());
        }
    }

    #[tokio::test]
    async fn test_post_sends_identity_as_json() {
        let client = Arc::new(MockSearchClient::with_status(201));
        dispatcher(&client).dispatch(&event("POST")).await;

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "POST");
        assert_eq!(calls[0].url, format!("{}/acc%2Fphotos%2F2024%2Fcat.png", BASE));
        assert_eq!(
            calls[0].headers,
            vec![("Content-Type".to_string(), "application/json".to_string())]
        );

        let body: Value = serde_json::from_str(calls[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "project_id": "acc",
                "container": "photos",
                "object": "2024/cat.png",
                "headers": {"Content-Length": "42"},
                "timestamp": "1700000000.00000"
            })
        );
    }

    #[tokio::test]
    async fn test_post_rejected() {
        let client = Arc::new(MockSearchClient::with_status(403));
        let result = dispatcher(&client).dispatch(&event("POST")).await;
        assert_eq!(result, DispatchResult::failed("Object not created"));
    }

    #[tokio::test]
    async fn test_post_404_is_not_tolerated() {
        let client = Arc::new(MockSearchClient::with_status(404));
        let result = dispatcher(&client).dispatch(&event("POST")).await;
        assert_eq!(result, DispatchResult::failed("Object not created"));
    }

    #[tokio::test]
    async fn test_post_transport_failure() {
        let client = Arc::new(MockSearchClient::failing());
        let result = dispatcher(&client).dispatch(&event("POST")).await;
        assert_eq!(result, DispatchResult::failed("Unable to POST data to ES"));
    }

    #[tokio::test]
    async fn test_put_uses_replace_request() {
        let client = Arc::new(MockSearchClient::with_status(200));
        let result = dispatcher(&client).dispatch(&event("PUT")).await;

        assert!(result.success);
        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "PUT");
        assert!(calls[0].body.is_some());
    }

    #[tokio::test]
    async fn test_put_failures() {
        let client = Arc::new(MockSearchClient::with_status(500));
        let result = dispatcher(&client).dispatch(&event("PUT")).await;
        assert_eq!(result, DispatchResult::failed("Object not created"));

        let client = Arc::new(MockSearchClient::failing());
        let result = dispatcher(&client).dispatch(&event("PUT")).await;
        assert_eq!(result, DispatchResult::failed("Unable to PUT data to ES"));
    }

    #[tokio::test]
    async fn test_delete_tolerates_missing_document() {
        for status in [200, 201, 404] {
            let client = Arc::new(MockSearchClient::with_status(status));
            let result = dispatcher(&client).dispatch(&event("DELETE")).await;
            assert_eq!(result, DispatchResult::ok(), "status {}", status);
        }
    }

    #[tokio::test]
    async fn test_delete_sends_no_body() {
        let client = Arc::new(MockSearchClient::with_status(200));
        dispatcher(&client).dispatch(&event("DELETE")).await;

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "DELETE");
        assert_eq!(calls[0].url, format!("{}/acc%2Fphotos%2F2024%2Fcat.png", BASE));
        assert!(calls[0].body.is_none());
    }

    #[tokio::test]
    async fn test_delete_failures() {
        let client = Arc::new(MockSearchClient::with_status(409));
        let result = dispatcher(&client).dispatch(&event("DELETE")).await;
        assert_eq!(result, DispatchResult::failed("Object not created"));

        let client = Arc::new(MockSearchClient::failing());
        let result = dispatcher(&client).dispatch(&event("DELETE")).await;
        assert_eq!(result, DispatchResult::failed("Unable to DELETE data on ES"));
    }

    #[tokio::test]
    async fn test_unsupported_method_makes_no_call() {
        let client = Arc::new(MockSearchClient::with_status(200));
        let result = dispatcher(&client).dispatch(&event("GET")).await;

        assert_eq!(result, DispatchResult::failed("Invalid http method"));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_uri_makes_no_call() {
        let client = Arc::new(MockSearchClient::with_status(200));
        let result = dispatcher(&client)
            .dispatch(&StorageEvent::new("POST", "/healthcheck"))
            .await;

        assert_eq!(result, DispatchResult::failed("Invalid object info"));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_uri_is_reported_before_invalid_method() {
        let client = Arc::new(MockSearchClient::with_status(200));
        let event = StorageEvent {
            http_method: "GET".to_string(),
            ..Default::default()
        };

        let result = dispatcher(&client).try_dispatch(&event).await;

        assert!(matches!(result, Err(DispatchError::InvalidObjectInfo(_))));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_typed_rejection_carries_status() {
        let client = Arc::new(MockSearchClient::with_status(503));
        let result = dispatcher(&client).try_dispatch(&event("PUT")).await;

        assert!(matches!(
            result,
            Err(DispatchError::RejectedByIndex {
                method: HttpMethod::Put,
                status: 503
            })
        ));
    }
}
