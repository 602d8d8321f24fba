//! HTTP search engine client.
//!
//! This module provides the concrete implementation of `SearchEngineClient`
//! on top of `reqwest`, optionally authenticating every request with an
//! OAuth2 bearer token.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use tracing::{debug, info, warn};

use crate::config::SearchClientConfig;
use crate::errors::SearchClientError;
use crate::http::token::TokenCache;
use crate::interfaces::SearchEngineClient;

/// Search engine client backed by `reqwest`.
///
/// When the configuration carries OAuth credentials, a bearer token is
/// obtained with the client-credentials grant and reused until it expires.
/// A `401 Unauthorized` from the search engine drops the cached token; the
/// request itself is not retried.
///
/// # Example
///
/// ```ignore
/// use object_indexer_repository::{OAuthCredentials, OAuthSearchClient, SearchClientConfig};
///
/// let credentials = OAuthCredentials::new("https://auth.local/token", "id", "secret");
/// let client = OAuthSearchClient::new(SearchClientConfig::with_oauth(credentials))?;
/// let status = client.delete("http://localhost:9200/objects/object/acc%2Fc%2Fo").await?;
/// ```
pub struct OAuthSearchClient {
    http: Client,
    token: Option<TokenCache>,
}

impl OAuthSearchClient {
    /// Create a new client from the given configuration.
    ///
    /// # Returns
    ///
    /// * `Ok(OAuthSearchClient)` - A new client instance
    /// * `Err(SearchClientError)` - If the underlying HTTP client cannot be built
    pub fn new(config: SearchClientConfig) -> Result<Self, SearchClientError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SearchClientError::configuration(e.to_string()))?;

        info!(
            timeout_secs = config.timeout.as_secs(),
            oauth = config.oauth.is_some(),
            "Created search engine client"
        );

        let token = config
            .oauth
            .map(|credentials| TokenCache::new(http.clone(), credentials));

        Ok(Self { http, token })
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<String>,
        headers: &[(&str, &str)],
    ) -> Result<u16, SearchClientError> {
        let mut request = self.http.request(method.clone(), url);

        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        if let Some(body) = body {
            request = request.body(body);
        }

        if let Some(token) = &self.token {
            request = request.bearer_auth(token.access_token().await?);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SearchClientError::transport(e.to_string()))?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            if let Some(token) = &self.token {
                warn!(url = %url, "Search engine rejected access token, discarding it");
                token.invalidate().await;
            }
        }

        debug!(method = %method, url = %url, status = status.as_u16(), "Search engine responded");
        Ok(status.as_u16())
    }
}

#[async_trait]
impl SearchEngineClient for OAuthSearchClient {
    async fn post(
        &self,
        url: &str,
        body: String,
        headers: &[(&str, &str)],
    ) -> Result<u16, SearchClientError> {
        self.send(Method::POST, url, Some(body), headers).await
    }

    async fn put(
        &self,
        url: &str,
        body: String,
        headers: &[(&str, &str)],
    ) -> Result<u16, SearchClientError> {
        self.send(Method::PUT, url, Some(body), headers).await
    }

    async fn delete(&self, url: &str) -> Result<u16, SearchClientError> {
        self.send(Method::DELETE, url, None, &[]).await
    }
}
