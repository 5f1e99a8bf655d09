use sha2::{Digest, Sha256};

/// Guards cached upstream responses with a SHA-256 digest.
///
/// The digest is computed when a response is cached and checked again on
/// retrieval; an entry that fails the check is discarded and the response is
/// refetched from upstream.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SealedCacheEntry {
    /// The cached response body (JSON string).
    pub body: String,
    /// SHA-256 digest of the body (hex encoded).
    pub digest: String,
}

impl SealedCacheEntry {
    /// Seals a response body with its digest.
    pub fn seal(body: String) -> Self {
        let digest = Self::digest_of(&body);
        Self { body, digest }
    }

    fn digest_of(body: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(body.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Whether the stored digest still matches the body.
    pub fn is_intact(&self) -> bool {
        Self::digest_of(&self.body) == self.digest
    }

    /// Serializes the entry for storage in a string-valued cache.
    pub fn into_cached(self) -> String {
        serde_json::to_string(&self).unwrap_or_default()
    }

    /// Deserializes a cached entry and verifies its digest.
    ///
    /// Returns `Some(body)` when the entry is intact, `None` when it is
    /// corrupt or not valid JSON.
    pub fn unseal(cached: &str) -> Option<String> {
        let entry: SealedCacheEntry = serde_json::from_str(cached).ok()?;

        if entry.is_intact() {
            Some(entry.body)
        } else {
            tracing::warn!(
                "Cache integrity check failed: digest mismatch, body length {}",
                entry.body.len()
            );
            None
        }
    }
}
