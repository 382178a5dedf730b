//! Sticky-slot fingerprinting.

use sha2::{Digest, Sha256};

use crate::context::PageRequest;

/// Deterministic key for the sticky session slot: one slot per pager
/// identity and listing view.
///
/// The path is normalized by stripping a trailing `/index`, so the index
/// route and its bare directory form share a slot. Query pairs are sorted
/// before hashing; parameter order in the URL must not change the slot.
/// Returns a 16-character hex string (64-bit hash).
pub fn sticky_fingerprint(table: &str, request: &PageRequest) -> String {
    let path = request
        .path
        .strip_suffix("/index")
        .unwrap_or(&request.path);

    let mut pairs: Vec<String> = request
        .query
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    pairs.sort();

    let mut hasher = Sha256::new();
    hasher.update(table.as_bytes());
    hasher.update(b"\n");
    hasher.update(path.as_bytes());
    hasher.update(b"\n");
    hasher.update(pairs.join("&").as_bytes());
    let bytes = hasher.finalize();
    hex::encode(&bytes[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_view_same_slot() {
        let a = PageRequest {
            path: "/users".to_string(),
            query: vec![("team".into(), "ops".into()), ("tab".into(), "active".into())],
            ..PageRequest::default()
        };
        let b = PageRequest {
            path: "/users".to_string(),
            query: vec![("tab".into(), "active".into()), ("team".into(), "ops".into())],
            ..PageRequest::default()
        };
        assert_eq!(sticky_fingerprint("user", &a), sticky_fingerprint("user", &b));
    }

    #[test]
    fn index_suffix_is_normalized() {
        let a = PageRequest::new("/users/index");
        let b = PageRequest::new("/users");
        assert_eq!(sticky_fingerprint("user", &a), sticky_fingerprint("user", &b));
    }

    #[test]
    fn different_identity_different_slot() {
        let request = PageRequest::new("/users");
        assert_ne!(
            sticky_fingerprint("user", &request),
            sticky_fingerprint("account", &request)
        );
    }

    #[test]
    fn token_and_page_never_reach_the_fingerprint() {
        // They live in dedicated request fields, not in `query`.
        let plain = PageRequest::new("/users");
        let navigated = PageRequest::new("/users").with_token("abc").with_page(4);
        assert_eq!(
            sticky_fingerprint("user", &plain),
            sticky_fingerprint("user", &navigated)
        );
    }

    #[test]
    fn fingerprint_is_short_hex() {
        let fp = sticky_fingerprint("user", &PageRequest::new("/users"));
        assert_eq!(fp.len(), 16);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
