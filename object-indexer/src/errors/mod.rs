//! Error types for the object indexer.

use object_indexer_repository::SearchClientError;
use object_indexer_shared::HttpMethod;
use thiserror::Error;

/// Errors that can occur while consuming from the queue.
#[derive(Error, Debug)]
pub enum IngestError {
    /// AMQP transport error.
    #[error("AMQP error: {0}")]
    AmqpError(String),
}

impl IngestError {
    /// Create an AMQP error.
    pub fn amqp(msg: impl Into<String>) -> Self {
        Self::AmqpError(msg.into())
    }
}

impl From<lapin::Error> for IngestError {
    fn from(err: lapin::Error) -> Self {
        Self::AmqpError(err.to_string())
    }
}

/// Reasons a storage event does not yield an object identity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The event has no string `uri`.
    #[error("uri is missing")]
    MissingUri,

    /// The `uri` is not shaped like `/version/AUTH_<tenant>/<container>/<object>`.
    #[error("invalid uri: <{uri}>")]
    InvalidUri { uri: String },
}

/// Why a storage event could not be mirrored into the search index.
///
/// The `Display` text of each variant is the reason reported for the
/// unacknowledged message.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// No identity could be parsed from the event. No request was made.
    #[error("Invalid object info")]
    InvalidObjectInfo(#[source] ParseError),

    /// The identity could not be serialized into a request body.
    #[error("Invalid object info")]
    Serialization(String),

    /// The event's method is not one we index. No request was made.
    #[error("Invalid http method")]
    InvalidHttpMethod(String),

    /// The request to the search engine did not complete.
    #[error("{}", transport_failure_message(.method))]
    Transport {
        method: HttpMethod,
        #[source]
        source: SearchClientError,
    },

    /// The search engine answered with a status that does not confirm the write.
    #[error("Object not created")]
    RejectedByIndex { method: HttpMethod, status: u16 },
}

fn transport_failure_message(method: &HttpMethod) -> &'static str {
    match method {
        HttpMethod::Post => "Unable to POST data to ES",
        HttpMethod::Put => "Unable to PUT data to ES",
        HttpMethod::Delete => "Unable to DELETE data on ES",
    }
}
