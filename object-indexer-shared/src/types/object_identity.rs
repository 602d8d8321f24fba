//! Object identity document.
//!
//! This module defines the document that mirrors a storage object in the
//! search engine.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Canonical identity of a storage object, sent as the search document body.
///
/// The `(tenant_id, container, object_key)` triple uniquely identifies the
/// object. `headers` and `timestamp` are only carried for create and replace
/// events; a deletion record has no payload.
///
/// Serialized with the field names the index expects:
///
/// ```json
/// {"project_id": "...", "container": "...", "object": "...", "headers": {}, "timestamp": ""}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectIdentity {
    #[serde(rename = "project_id")]
    pub tenant_id: String,
    pub container: String,
    #[serde(rename = "object")]
    pub object_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ObjectIdentity {
    /// Create an identity without payload, as used for deletions.
    ///
    /// # Example
    ///
    /// ```
    /// use object_indexer_shared::ObjectIdentity;
    ///
    /// let identity = ObjectIdentity::new("acc", "photos", "2024/cat.png");
    /// assert_eq!(identity.document_id(), "acc/photos/2024/cat.png");
    /// ```
    pub fn new(
        tenant_id: impl Into<String>,
        container: impl Into<String>,
        object_key: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            container: container.into(),
            object_key: object_key.into(),
            headers: None,
            timestamp: None,
        }
    }

    /// Attach the object's headers and timestamp.
    pub fn with_payload(mut self, headers: Map<String, Value>, timestamp: String) -> Self {
        self.headers = Some(headers);
        self.timestamp = Some(timestamp);
        self
    }

    /// The unencoded document id: `tenant/container/object_key`.
    pub fn document_id(&self) -> String {
        format!("{}/{}/{}", self.tenant_id, self.container, self.object_key)
    }
}
