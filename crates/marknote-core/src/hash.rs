//! Content fingerprints used for change detection.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 fingerprint of a note's content.
///
/// Returns `sha256:` followed by the lowercase hex digest, so fingerprints are
/// self-describing when they show up in logs.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("sha256:{}", hex::encode(hasher.finalize()))
}
