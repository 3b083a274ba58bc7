//! Deterministic identifiers for synthesized resources
//!
//! Resources that no provider API assigns an id to get one derived from
//! their identifying attributes. The derivation must never change between
//! runs or releases: a different id for the same logical object shows up as
//! one deleted and one added resource on every scan.
//!
//! The hash is SHA-256 over the UTF-8 input, truncated to its first eight
//! bytes and rendered as lowercase hex.

use sha2::{Digest, Sha256};

/// Number of hex characters kept from the digest
const HASH_LEN: usize = 16;

/// Hash `input` into a short, stable hex string.
pub fn stable_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(HASH_LEN);
    hex
}

/// Build `"{prefix}-{hash}"` from ordered identifying parts.
///
/// Each part is followed by `-` before hashing, so `["a", "b"]` never
/// collides with `["ab"]`.
pub fn hashed_id<S: AsRef<str>>(prefix: &str, parts: &[S]) -> String {
    let mut buf = String::new();
    for part in parts {
        buf.push_str(part.as_ref());
        buf.push('-');
    }
    format!("{}-{}", prefix, stable_hash(&buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_hash_is_deterministic() {
        assert_eq!(stable_hash("sg-1234-"), stable_hash("sg-1234-"));
    }

    #[test]
    fn stable_hash_known_value() {
        // sha256("hello world") = b94d27b9934d3e08...
        assert_eq!(stable_hash("hello world"), "b94d27b9934d3e08");
    }

    #[test]
    fn different_input_different_hash() {
        assert_ne!(stable_hash("aaa"), stable_hash("bbb"));
    }

    #[test]
    fn hashed_id_separates_parts() {
        assert_ne!(hashed_id("x", &["a", "b"]), hashed_id("x", &["ab"]));
        assert!(hashed_id("nacl", &["acl-1"]).starts_with("nacl-"));
    }
}
