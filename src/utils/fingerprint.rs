//! Client fingerprinting for click events.

use sha2::{Digest, Sha256};

/// Hashes a client-identifying value into a short stable fingerprint.
///
/// Returns the first 16 hex characters (8 bytes) of SHA-256. Enough
/// cardinality for uniqueness estimation without storing the raw value.
/// Empty input maps to an empty fingerprint so absent headers stay absent.
pub fn fingerprint(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let digest = Sha256::digest(value.as_bytes());
    hex::encode(&digest[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        // SHA-256("hello") = 2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824
        assert_eq!(fingerprint("hello"), "2cf24dba5fb0a30e");
    }

    #[test]
    fn test_empty_input_stays_empty() {
        assert_eq!(fingerprint(""), "");
    }

    #[test]
    fn test_length_and_charset() {
        let fp = fingerprint("192.168.1.1");
        assert_eq!(fp.len(), 16);
        assert!(fp.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(fingerprint("Mozilla/5.0"), fingerprint("Mozilla/5.0"));
        assert_ne!(fingerprint("Mozilla/5.0"), fingerprint("curl/8.0"));
    }
}
