//! Content fingerprints for cache-busting file names.
//!
//! A fingerprint is the leading hex characters of the SHA-256 digest of a
//! source file's bytes. It depends only on content, never on the path or
//! modification time, so a `git checkout` or a rename leaves it unchanged
//! while any edit to the pixels produces a new file name.
//!
//! Truncating to 8 hex characters (32 bits) keeps names short. That is plenty
//! to tell apart a few thousand images, but it is not collision resistant
//! against an adversary and must not be used as an integrity check.

use sha2::{Digest, Sha256};

/// Fingerprint length used by the stock configuration.
pub const DEFAULT_LENGTH: usize = 8;

/// Full SHA-256 hex digest has 64 characters; longer requests are capped.
const MAX_LENGTH: usize = 64;

/// Lowercase hex fingerprint of `bytes`, `length` characters long.
pub fn fingerprint(bytes: &[u8], length: usize) -> String {
    let digest = Sha256::digest(bytes);
    let mut hex = format!("{:x}", digest);
    hex.truncate(length.min(MAX_LENGTH));
    hex
}
