//! Validation result cache (cache-aside).
//!
//! The cache is consulted before a validation and populated after a
//! successful one; it is never the sole source of truth. Entries are keyed by
//! a SHA-256 digest of provider + raw secret so plaintext credentials never
//! reach the cache layer, and only valid results are stored (a transiently
//! invalid key is re-checked on its next request instead of poisoning the
//! cache).
//!
//! The storage backend is pluggable via [`ValidationCache`]; the in-memory
//! implementation is an LRU with per-entry expiry.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use sha2::{Digest, Sha256};

use crate::types::{Provider, ValidationResult};

/// Pluggable key-value store contract for validation results.
///
/// All operations are async-capable (a remote backend may be network-bound)
/// and independently keyed by opaque string. Concurrent access to distinct
/// keys must not corrupt the store; that guarantee is the backend's.
#[async_trait]
pub trait ValidationCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<ValidationResult>;
    async fn set(&self, key: String, value: ValidationResult, ttl: Duration);
    async fn remove(&self, key: &str);
}

/// Derive the cache key for a credential.
///
/// One-way: the raw secret is hashed, never stored.
pub fn cache_key(provider: Provider, raw_secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(provider.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(raw_secret.as_bytes());
    let digest = hasher.finalize();
    let hash: String = digest.iter().map(|byte| format!("{byte:02x}")).collect();
    format!("key:validation:{provider}:{hash}")
}

struct CacheEntry {
    result: ValidationResult,
    expires_at: Instant,
}

/// In-memory [`ValidationCache`] backed by an LRU with per-entry expiry.
pub struct MemoryValidationCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
}

impl MemoryValidationCache {
    /// A cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("non-zero capacity");
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }
}

impl Default for MemoryValidationCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl ValidationCache for MemoryValidationCache {
    async fn get(&self, key: &str) -> Option<ValidationResult> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.result.clone()),
            Some(_) => {
                entries.pop(key);
                None
            }
            None => None,
        }
    }

    async fn set(&self, key: String, value: ValidationResult, ttl: Duration) {
        let entry = CacheEntry {
            result: value,
            expires_at: Instant::now() + ttl,
        };
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .put(key, entry);
    }

    async fn remove(&self, key: &str) {
        self.entries.lock().expect("cache lock poisoned").pop(key);
    }
}
