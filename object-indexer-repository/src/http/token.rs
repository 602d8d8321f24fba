//! OAuth2 client-credentials token cache.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::OAuthCredentials;
use crate::errors::SearchClientError;

/// Tokens are refreshed this long before the endpoint says they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    /// `None` when the endpoint did not report a lifetime.
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |expires_at| now < expires_at)
    }
}

/// Fetches and caches bearer tokens with the `client_credentials` grant.
pub(crate) struct TokenCache {
    http: Client,
    credentials: OAuthCredentials,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    pub(crate) fn new(http: Client, credentials: OAuthCredentials) -> Self {
        Self {
            http,
            credentials,
            cached: Mutex::new(None),
        }
    }

    /// Return a valid access token, fetching a new one if none is cached or
    /// the cached one is about to expire.
    pub(crate) async fn access_token(&self) -> Result<String, SearchClientError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_fresh(Instant::now()) {
                return Ok(token.access_token.clone());
            }
            debug!("Cached access token expired");
        }

        let token = self.fetch().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);

        Ok(access_token)
    }

    /// Drop the cached token so the next request fetches a new one.
    pub(crate) async fn invalidate(&self) {
        self.cached.lock().await.take();
    }

    async fn fetch(&self) -> Result<CachedToken, SearchClientError> {
        let response = self
            .http
            .post(&self.credentials.token_endpoint)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| SearchClientError::token(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchClientError::token(format!(
                "Token endpoint returned status {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SearchClientError::token(format!("Invalid token response: {}", e)))?;

        let expires_at = expiry(Instant::now(), token.expires_in);

        info!(
            token_endpoint = %self.credentials.token_endpoint,
            expires_in = ?token.expires_in,
            "Obtained access token"
        );

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at,
        })
    }
}

/// When a token issued at `now` with lifetime `expires_in` should be refreshed.
///
/// Lifetimes too large to represent are treated as never expiring.
fn expiry(now: Instant, expires_in: Option<u64>) -> Option<Instant> {
    let lifetime = Duration::from_secs(expires_in?).saturating_sub(EXPIRY_MARGIN);
    now.checked_add(lifetime)
}
