//! Short code generation and validation.
//!
//! Codes are drawn from the base62 alphabet `[0-9A-Za-z]`. The validator
//! accepts lengths 6-12; the generator produces the configured length
//! (default 8) within that range.

use rand::Rng;

/// Alphabet for short codes. Index order matters only for the generator.
pub const CODE_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Minimum accepted code length.
pub const MIN_CODE_LENGTH: usize = 6;

/// Maximum accepted code length.
pub const MAX_CODE_LENGTH: usize = 12;

/// Returns true iff `code` is a syntactically valid short code.
///
/// Valid means length 6-12 and every byte in `[0-9A-Za-z]`. This runs before
/// any cache or store I/O, so it must stay allocation-free and cheap.
pub fn is_valid_code(code: &str) -> bool {
    if code.len() < MIN_CODE_LENGTH || code.len() > MAX_CODE_LENGTH {
        return false;
    }
    code.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Generates a random short code of the given length.
///
/// The caller is responsible for collision handling (lookup-and-retry on
/// insert). `length` is expected to be within [6, 12]; `Config::validate`
/// enforces that for the configured value.
pub fn generate_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}
