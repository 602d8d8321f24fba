//! Search client error types.

use thiserror::Error;

/// Errors raised by a `SearchEngineClient`.
///
/// Only failures to complete a request are errors. A request that reaches the
/// search engine and comes back with any status code, including 4xx and 5xx,
/// is a successful call whose status the caller classifies.
#[derive(Debug, Clone, Error)]
pub enum SearchClientError {
    /// The request could not be sent or no response was received
    /// (connection refused, DNS failure, timeout, ...).
    #[error("Transport error: {0}")]
    Transport(String),

    /// An access token could not be obtained from the token endpoint.
    #[error("Token error: {0}")]
    Token(String),

    /// The client could not be built from the given configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl SearchClientError {
    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a token error.
    pub fn token(msg: impl Into<String>) -> Self {
        Self::Token(msg.into())
    }

    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
