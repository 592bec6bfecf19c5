// src/services/cache.rs
// DOCUMENTATION: Fast in-memory cache tier plus the photo cache interface
// PURPOSE: Reduce object-storage round trips by caching photo listings

use crate::errors::GalleryError;
use crate::models::Photo;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Cache entry with expiration
#[derive(Clone, Debug)]
struct CacheEntry<T> {
    data: T,
    expires_at: Instant,
}

impl<T> CacheEntry<T> {
    fn new(data: T, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// One tier of the photo cache. get returns None on a clean miss; I/O
/// problems surface as errors so callers can fall through to the next tier.
#[async_trait]
pub trait PhotoCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<Photo>>, GalleryError>;
    async fn set(&self, key: &str, photos: &[Photo], ttl_seconds: u64) -> Result<(), GalleryError>;
}

/// Cache key for a prefix listing. Limited fetches are cached separately
/// because they hold a subset of the full listing.
pub fn photo_cache_key(prefix: &str, limit: Option<u32>) -> String {
    match limit {
        Some(n) if n > 0 => format!("photos-{}-limit-{}", prefix, n),
        _ => format!("photos-{}", prefix),
    }
}

/// Normalize a cache key into a safe blob filename: strip anything outside
/// letters/digits/spaces/hyphens, collapse whitespace to underscores, cap at
/// 100 characters, append ".json".
pub fn sanitize_key(key: &str) -> String {
    let cleaned: String = key
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();

    let underscored = cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");

    let truncated: String = underscored.chars().take(100).collect();
    format!("{}.json", truncated)
}

/// Simple in-memory cache with TTL
/// DOCUMENTATION: Thread-safe string cache backing the fast tier and the
/// legacy API result cache
pub struct MemoryCache {
    store: Arc<RwLock<HashMap<String, CacheEntry<String>>>>,
    default_ttl: Duration,
}

impl MemoryCache {
    /// Create new cache with default TTL
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            default_ttl: Duration::from_secs(ttl_seconds),
        }
    }

    /// Get cached value
    pub async fn get(&self, key: &str) -> Option<String> {
        let store = self.store.read().await;

        if let Some(entry) = store.get(key) {
            if !entry.is_expired() {
                log::debug!("Cache HIT for key: {}", key);
                return Some(entry.data.clone());
            } else {
                log::debug!("Cache EXPIRED for key: {}", key);
            }
        } else {
            log::debug!("Cache MISS for key: {}", key);
        }

        None
    }

    /// Set cached value with default TTL
    pub async fn set(&self, key: String, value: String) {
        self.set_with_ttl(key, value, self.default_ttl).await;
    }

    /// Set cached value with custom TTL
    pub async fn set_with_ttl(&self, key: String, value: String, ttl: Duration) {
        let mut store = self.store.write().await;
        store.insert(key.clone(), CacheEntry::new(value, ttl));
        log::debug!("Cache SET for key: {} (TTL: {}s)", key, ttl.as_secs());
    }

    /// Clear expired entries
    pub async fn cleanup(&self) {
        let mut store = self.store.write().await;
        let before_count = store.len();
        store.retain(|_, entry| !entry.is_expired());
        let after_count = store.len();

        if before_count > after_count {
            log::info!(
                "Cache cleanup: removed {} expired entries ({} remaining)",
                before_count - after_count,
                after_count
            );
        }
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        let store = self.store.read().await;
        let total = store.len();
        let expired = store.values().filter(|e| e.is_expired()).count();

        CacheStats {
            total_entries: total,
            expired_entries: expired,
            active_entries: total - expired,
        }
    }
}

/// Cache statistics
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
}

/// Fast photo cache tier over the in-memory store, serializing photo
/// listings to JSON strings
pub struct MemoryPhotoCache {
    inner: MemoryCache,
}

impl MemoryPhotoCache {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            inner: MemoryCache::new(ttl_seconds),
        }
    }

    pub async fn cleanup(&self) {
        self.inner.cleanup().await;
    }
}

#[async_trait]
impl PhotoCache for MemoryPhotoCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<Photo>>, GalleryError> {
        match self.inner.get(&sanitize_key(key)).await {
            Some(raw) => {
                let photos = serde_json::from_str(&raw)
                    .map_err(|e| GalleryError::CacheError(format!("corrupt cache entry: {}", e)))?;
                Ok(Some(photos))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, photos: &[Photo], ttl_seconds: u64) -> Result<(), GalleryError> {
        let raw = serde_json::to_string(photos)
            .map_err(|e| GalleryError::CacheError(format!("serialization failed: {}", e)))?;

        self.inner
            .set_with_ttl(sanitize_key(key), raw, Duration::from_secs(ttl_seconds))
            .await;

        Ok(())
    }
}

/// Start background cleanup task
/// DOCUMENTATION: Periodically removes expired entries
pub fn start_cleanup_task(cache: Arc<MemoryPhotoCache>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            cache.cleanup().await;
        }
    });
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Recording photo cache tier for orchestration tests
    #[derive(Default)]
    pub struct FakePhotoCache {
        pub entries: Mutex<HashMap<String, Vec<Photo>>>,
        pub fail_reads: AtomicBool,
        pub get_calls: AtomicUsize,
        pub set_calls: AtomicUsize,
    }

    impl FakePhotoCache {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn seed(&self, key: &str, photos: Vec<Photo>) {
            self.entries.lock().unwrap().insert(key.to_string(), photos);
        }

        pub fn stored(&self, key: &str) -> Option<Vec<Photo>> {
            self.entries.lock().unwrap().get(key).cloned()
        }
    }

    #[async_trait]
    impl PhotoCache for FakePhotoCache {
        async fn get(&self, key: &str) -> Result<Option<Vec<Photo>>, GalleryError> {
            self.get_calls.fetch_add(1, Ordering::SeqCst);

            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(GalleryError::CacheError("read failed".to_string()));
            }

            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn set(
            &self,
            key: &str,
            photos: &[Photo],
            _ttl_seconds: u64,
        ) -> Result<(), GalleryError> {
            self.set_calls.fetch_add(1, Ordering::SeqCst);
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), photos.to_vec());
            Ok(())
        }
    }
}
