//! Storage event types.
//!
//! A storage event is the change notification published to the queue whenever
//! an object is created, replaced or deleted in object storage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// HTTP methods that map to a search index operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Object created; indexed with a create request.
    Post,
    /// Object replaced; indexed with a replace request.
    Put,
    /// Object removed; the document is deleted.
    Delete,
}

impl HttpMethod {
    /// The method name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    /// Method names are matched exactly; `post` is not `POST`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            other => Err(other.to_string()),
        }
    }
}

/// A change notification describing an object storage operation.
///
/// # Fields
///
/// - `http_method`: The storage operation (`POST`, `PUT` or `DELETE`). Kept as
///   the raw string so that unsupported methods can be reported instead of
///   failing the decode.
/// - `uri`: Storage path shaped like `/v1/AUTH_<tenant>/<container>/<object>`.
///   Absent, `null` and non-string values all decode to `None`.
/// - `headers`: Object metadata headers, copied verbatim into the document.
///   Values that are not a JSON object decode to `None`.
/// - `timestamp`: Time of the storage operation. Numeric timestamps are kept
///   as their JSON text; other non-string values decode to `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StorageEvent {
    #[serde(default)]
    pub http_method: String,
    #[serde(default, deserialize_with = "string_or_none")]
    pub uri: Option<String>,
    #[serde(
        default,
        deserialize_with = "object_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub headers: Option<Map<String, Value>>,
    #[serde(
        default,
        deserialize_with = "text_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<String>,
}

impl StorageEvent {
    /// Create an event with no headers or timestamp.
    ///
    /// # Example
    ///
    /// ```
    /// use object_indexer_shared::{HttpMethod, StorageEvent};
    ///
    /// let event = StorageEvent::new("DELETE", "/v1/AUTH_acc/photos/cat.png");
    /// assert_eq!(event.method(), Some(HttpMethod::Delete));
    /// ```
    pub fn new(http_method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            http_method: http_method.into(),
            uri: Some(uri.into()),
            headers: None,
            timestamp: None,
        }
    }

    /// Attach metadata headers to the event.
    pub fn with_headers(mut self, headers: Map<String, Value>) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Attach a timestamp to the event.
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// The parsed HTTP method, or `None` if it is not one we index.
    pub fn method(&self) -> Option<HttpMethod> {
        self.http_method.parse().ok()
    }

    /// Whether this event removes the object.
    pub fn is_delete(&self) -> bool {
        self.method() == Some(HttpMethod::Delete)
    }
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

fn object_or_none<'de, D>(deserializer: D) -> Result<Option<Map<String, Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(Some(map)),
        _ => Ok(None),
    }
}

fn text_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Ok(None),
    }
}
