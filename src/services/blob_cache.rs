// src/services/blob_cache.rs
// DOCUMENTATION: Durable blob-backed cache tier
// PURPOSE: Persist photo listings as JSON blobs that survive restarts

use crate::errors::GalleryError;
use crate::models::Photo;
use crate::services::cache::{sanitize_key, PhotoCache};
use crate::storage::ObjectStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

const CACHE_PREFIX: &str = "cache/";

/// Durable cache tier storing serialized listings under a dedicated prefix
/// in the object store. Slower than the memory tier and read via a
/// list-then-download pair, mirroring blob-store semantics.
pub struct BlobCache {
    store: Arc<dyn ObjectStore>,
}

impl BlobCache {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    fn blob_name(key: &str) -> String {
        format!("{}{}", CACHE_PREFIX, sanitize_key(key))
    }
}

#[async_trait]
impl PhotoCache for BlobCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<Photo>>, GalleryError> {
        let blob_name = Self::blob_name(key);

        let blobs = self.store.list_objects(CACHE_PREFIX).await?;
        if !blobs.iter().any(|b| b.name == blob_name) {
            log::debug!("Blob cache miss for {}", blob_name);
            return Ok(None);
        }

        log::debug!("Blob cache hit for {}", blob_name);
        let bytes = self.store.download(&blob_name).await?;
        let photos = serde_json::from_slice(&bytes)
            .map_err(|e| GalleryError::CacheError(format!("corrupt blob cache entry: {}", e)))?;

        Ok(Some(photos))
    }

    async fn set(&self, key: &str, photos: &[Photo], ttl_seconds: u64) -> Result<(), GalleryError> {
        let blob_name = Self::blob_name(key);
        let bytes = serde_json::to_vec(photos)
            .map_err(|e| GalleryError::CacheError(format!("serialization failed: {}", e)))?;

        let mut metadata = HashMap::new();
        metadata.insert(
            "cacheControl".to_string(),
            format!("public, max-age={}", ttl_seconds),
        );

        self.store
            .upload(&blob_name, bytes, "application/json", metadata)
            .await?;

        log::debug!("Blob cache write for {}", blob_name);
        Ok(())
    }
}
