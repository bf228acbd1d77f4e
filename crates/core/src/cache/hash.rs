//! URL fingerprints used as cache keys.

use sha2::{Digest, Sha256};

/// Compute the cache key for a requested URL.
///
/// The raw string is hashed as given; no canonicalization happens here, so
/// `https://a.com` and `https://a.com/` are distinct keys.
pub fn fingerprint(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
