//! Cache key derivation using SHA-256 hashes

use sha2::{Digest, Sha256};

/// Cache partition key derived from a bearer credential.
///
/// Opaque, fixed-length, and one-way: equal credentials always produce equal
/// keys, and the hex digest is the only form that ever reaches a log line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionKey(String);

impl PartitionKey {
    /// Hex-encoded digest, safe to log
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

/// Derive the cache partition key for a bearer credential.
///
/// Deterministic and infallible for any non-empty input; callers reject empty
/// credentials before getting here.
pub fn partition_key(credential: &str) -> PartitionKey {
    let mut hasher = Sha256::new();
    hasher.update(credential.as_bytes());
    PartitionKey(format!("{:x}", hasher.finalize()))
}

/// Generate a deterministic key for one cached request.
///
/// The key hashes the method, URL, and sorted headers, so header order never
/// affects the signature.
pub fn request_key(method: &str, url: &str, headers: &[(String, String)]) -> String {
    let mut hasher = Sha256::new();

    hasher.update(method.as_bytes());
    hasher.update(b"|");
    hasher.update(url.as_bytes());
    hasher.update(b"|");

    let mut sorted_headers: Vec<_> = headers.iter().collect();
    sorted_headers.sort_by(|(a, _), (b, _)| a.cmp(b));

    for (name, value) in sorted_headers {
        hasher.update(name.as_bytes());
        hasher.update(b"=");
        hasher.update(value.as_bytes());
        hasher.update(b"&");
    }

    format!("{:x}", hasher.finalize())
}
