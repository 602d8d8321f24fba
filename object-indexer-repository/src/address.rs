//! Document address builder.
//!
//! Maps an object identity to the URL of its search document.

use object_indexer_shared::ObjectIdentity;
use url::form_urlencoded;

/// Percent-encode a document id so it can be used as a single path segment.
///
/// Uses form encoding: alphanumerics and `*-._` are kept, a space becomes `+`
/// and every other byte, `/` included, is escaped as `%XX`.
///
/// # Example
///
/// ```
/// use object_indexer_repository::encode_document_id;
///
/// assert_eq!(encode_document_id("acc/photos/my cat.png"), "acc%2Fphotos%2Fmy+cat.png");
/// ```
pub fn encode_document_id(id: &str) -> String {
    form_urlencoded::byte_serialize(id.as_bytes()).collect()
}

/// Build the search engine URL of the document for `identity`.
///
/// The document id is `tenant/container/object_key`, encoded as one opaque
/// segment and appended to `base`. Trailing slashes on `base` are ignored.
///
/// Tenant and container come from single path segments and cannot contain a
/// slash, so two different parsed identities never share an address.
pub fn document_address(base: &str, identity: &ObjectIdentity) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        encode_document_id(&identity.document_id())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://search.local:9200/objects/object";

    #[test]
    fn test_document_address() {
        let identity = ObjectIdentity::new("acc", "photos", "cat.png");
        assert_eq!(
            document_address(BASE, &identity),
            "http://search.local:9200/objects/object/acc%2Fphotos%2Fcat.png"
        );
    }

    #[test]
    fn test_slashes_in_object_key_are_escaped() {
        let identity = ObjectIdentity::new("acc", "c", "a/b/j");
        let address = document_address(BASE, &identity);

        assert_eq!(address, format!("{}/acc%2Fc%2Fa%2Fb%2Fj", BASE));
        assert!(!address[BASE.len() + 1..].contains('/'));
    }

    #[test]
    fn test_reserved_characters() {
        assert_eq!(encode_document_id("a b"), "a+b");
        assert_eq!(encode_document_id("a+b"), "a%2Bb");
        assert_eq!(encode_document_id("q?x=1&y#z"), "q%3Fx%3D1%26y%23z");
        assert_eq!(encode_document_id("100%"), "100%25");
        assert_eq!(encode_document_id("naïve"), "na%C3%AFve");
    }

    #[test]
    fn test_trailing_slash_on_base() {
        let identity = ObjectIdentity::new("acc", "c", "o");
        assert_eq!(
            document_address("http://es/idx/", &identity),
            document_address("http://es/idx", &identity)
        );
    }

    #[test]
    fn test_distinct_identities_get_distinct_addresses() {
        let identities = [
            ObjectIdentity::new("acc", "c", "a/b"),
            ObjectIdentity::new("acc", "c", "a+b"),
            ObjectIdentity::new("acc", "c", "a b"),
            ObjectIdentity::new("acc", "c", "a%2Fb"),
            ObjectIdentity::new("acc", "ca", "b"),
            ObjectIdentity::new("acc2", "c", "a/b"),
        ];

        let addresses: std::collections::HashSet<String> = identities
            .iter()
            .map(|identity| document_address(BASE, identity))
            .collect();

        assert_eq!(addresses.len(), identities.len());
    }
}
