//! Request identity hashing for store keys.

use sha2::{Digest, Sha256};

/// Compute the store key for a request.
///
/// The method is uppercased so `get` and `GET` share an entry. No request
/// headers take part in the key, so every variant of a URL shares one slot.
pub fn compute_cache_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
