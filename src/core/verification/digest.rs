//! Payload digests for verification and the ledger
//!
//! Digests identify transferred payloads in logs, ledger entries, and
//! mismatch reports without reproducing clinical content.

use sha2::{Digest, Sha256};

/// SHA-256 hex digest of a payload (64 characters).
///
/// # Examples
///
/// ```
/// use aegis::core::verification::digest::digest_bytes;
///
/// let digest = digest_bytes(b"payload");
/// assert_eq!(digest.len(), 64);
/// ```
pub fn digest_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    format!("{result:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_known_value() {
        assert_eq!(
            digest_bytes(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_digest_is_deterministic() {
        assert_eq!(digest_bytes(b"record bytes"), digest_bytes(b"record bytes"));
    }

    #[test]
    fn test_digest_differs_for_different_payloads() {
        assert_ne!(digest_bytes(b"record"), digest_bytes(b"recorD"));
    }

    #[test]
    fn test_digest_is_hex() {
        let digest = digest_bytes(b"Hello, World!");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
