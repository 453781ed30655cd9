use lru::LruCache;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Session-scoped cache of extracted document text.
///
/// Keyed by content hash, so re-adding the same bytes within a session never
/// re-extracts. Owned by the caller and passed by reference into the
/// pipeline; dropped when the session ends.
pub struct ExtractionCache {
    inner: Mutex<LruCache<String, Arc<String>>>,
}

impl ExtractionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(NonZeroUsize::new(capacity.max(1)).unwrap())),
        }
    }

    /// Cache key for a document's raw bytes.
    pub fn key(content: &[u8]) -> String {
        hex::encode(Sha256::digest(content))
    }

    pub fn get(&self, key: &str) -> Option<Arc<String>> {
        self.inner.lock().get(key).cloned()
    }

    pub fn put(&self, key: String, text: Arc<String>) {
        self.inner.lock().put(key, text);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ExtractionCache {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_bytes_share_a_key() {
        assert_eq!(ExtractionCache::key(b"abc"), ExtractionCache::key(b"abc"));
        assert_ne!(ExtractionCache::key(b"abc"), ExtractionCache::key(b"abd"));
    }

    #[test]
    fn put_then_get() {
        let cache = ExtractionCache::default();
        let key = ExtractionCache::key(b"some file bytes");
        assert!(cache.get(&key).is_none());

        cache.put(key.clone(), Arc::new("extracted".to_string()));
        assert_eq!(cache.get(&key).unwrap().as_str(), "extracted");
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = ExtractionCache::new(1);
        cache.put("a".into(), Arc::new("first".to_string()));
        cache.put("b".into(), Arc::new("second".to_string()));
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
    }
}
