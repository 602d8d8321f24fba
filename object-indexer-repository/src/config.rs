//! Configuration types for the search engine client.

use std::time::Duration;

/// Default request timeout for search engine calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// OAuth2 client credentials used to obtain bearer tokens.
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    /// Token endpoint accepting the `client_credentials` grant.
    pub token_endpoint: String,
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
}

impl OAuthCredentials {
    /// Create a new set of client credentials.
    pub fn new(
        token_endpoint: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            token_endpoint: token_endpoint.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

/// Configuration for `OAuthSearchClient`.
#[derive(Debug, Clone)]
pub struct SearchClientConfig {
    /// Timeout applied to each search engine and token request.
    pub timeout: Duration,
    /// Client credentials. When `None`, requests are sent unauthenticated.
    pub oauth: Option<OAuthCredentials>,
}

impl Default for SearchClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_REQUEST_TIMEOUT,
            oauth: None,
        }
    }
}

impl SearchClientConfig {
    /// Create a config that authenticates with the given credentials.
    pub fn with_oauth(credentials: OAuthCredentials) -> Self {
        Self {
            oauth: Some(credentials),
            ..Default::default()
        }
    }

    /// Override the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
