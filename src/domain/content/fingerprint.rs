use sha2::{Digest, Sha256};

/// Fingerprints normalized text with SHA-256 over its UTF-8 bytes, rendered
/// as lowercase hex.
///
/// Equal fingerprints mean "probably equal text": callers must re-verify
/// against stored plaintext before trusting a cache hit, since distinct
/// texts can in principle share a digest.
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
