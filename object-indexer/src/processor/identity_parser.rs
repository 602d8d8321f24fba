//! Identity parser.
//!
//! Extracts the canonical `(tenant, container, object)` identity from the
//! storage path carried by an event.

use object_indexer_shared::{ObjectIdentity, StorageEvent};

use crate::errors::ParseError;

/// Prefix object storage puts in front of tenant ids in account paths.
const TENANT_PREFIX: &str = "AUTH_";

/// `""`, version, tenant, container and at least one object key segment.
const MIN_URI_SEGMENTS: usize = 5;

/// Parse the object identity out of a storage event.
///
/// The uri is split on `/`: segment 2 is the tenant (with a leading `AUTH_`
/// removed), segment 3 the container, and everything after that is joined
/// back with `/` into the object key, so keys like `a/b/c` survive intact.
///
/// Create and replace events carry the event headers (empty when absent) and
/// timestamp (empty when absent). Delete events carry neither.
///
/// # Errors
///
/// * `ParseError::MissingUri` - the event has no string uri
/// * `ParseError::InvalidUri` - fewer than five segments, or an empty tenant,
///   container or object key
///
/// # Example
///
/// ```
/// use object_indexer::processor::parse_identity;
/// use object_indexer_shared::StorageEvent;
///
/// let event = StorageEvent::new("DELETE", "/v1/AUTH_acc/photos/2024/cat.png");
/// let identity = parse_identity(&event).unwrap();
///
/// assert_eq!(identity.tenant_id, "acc");
/// assert_eq!(identity.container, "photos");
/// assert_eq!(identity.object_key, "2024/cat.png");
/// ```
pub fn parse_identity(event: &StorageEvent) -> Result<ObjectIdentity, ParseError> {
    let uri = event.uri.as_deref().ok_or(ParseError::MissingUri)?;
    let invalid = || ParseError::InvalidUri {
        uri: uri.to_string(),
    };

    let segments: Vec<&str> = uri.split('/').collect();
    if segments.len() < MIN_URI_SEGMENTS {
        return Err(invalid());
    }

    let tenant_id = segments[2]
        .strip_prefix(TENANT_PREFIX)
        .unwrap_or(segments[2]);
    let container = segments[3];
    let object_key = segments[4..].join("/");

    if tenant_id.is_empty() || container.is_empty() || object_key.is_empty() {
        return Err(invalid());
    }

    let identity = ObjectIdentity::new(tenant_id, container, object_key);

    if event.is_delete() {
        return Ok(identity);
    }

    Ok(identity.with_payload(
        event.headers.clone().unwrap_or_default(),
        event.timestamp.clone().unwrap_or_default(),
    ))
}
