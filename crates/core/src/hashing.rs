//! SHA-256 digests and digest comparison.
//!
//! Admin bearer tokens are never compared as plain strings: both sides are
//! hashed first and the digests compared in constant time.

use sha2::{Digest, Sha256};

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Compare two byte strings without short-circuiting on the first mismatch.
///
/// Returns `false` immediately only when the lengths differ, which for
/// fixed-size digests leaks nothing.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Check a presented secret against the digest of the expected one.
pub fn secret_matches(presented: &str, expected_hash: &str) -> bool {
    constant_time_eq(
        sha256_hex(presented.as_bytes()).as_bytes(),
        expected_hash.as_bytes(),
    )
}
