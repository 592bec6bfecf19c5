// src/storage/object_store.rs
// DOCUMENTATION: Capability interface over object storage
// PURPOSE: Decouple the photo pipeline from any one storage SDK

use crate::errors::GalleryError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

/// A listed storage object with its resource and custom metadata
#[derive(Debug, Clone)]
pub struct ObjectRecord {
    /// Object key within the bucket
    pub name: String,
    /// Object size in bytes
    pub size: u64,
    /// Content type reported by the store
    pub content_type: Option<String>,
    /// Last update timestamp of the object resource
    pub updated: Option<DateTime<Utc>>,
    /// Custom key/value metadata attached to the object
    pub metadata: HashMap<String, String>,
}

/// Minimal capability surface the photo pipeline needs from a bucket.
/// One concrete adapter per backend; chosen at construction, not by
/// inheritance.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List objects under a prefix. Single page, no pagination.
    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectRecord>, GalleryError>;

    /// Request a time-limited signed read URL for an object
    async fn signed_url(&self, name: &str, ttl: Duration) -> Result<String, GalleryError>;

    /// Permanent public URL for an object
    fn public_url(&self, name: &str) -> String;

    /// Download the full object bytes
    async fn download(&self, name: &str) -> Result<Vec<u8>, GalleryError>;

    /// Write an object with content type and custom metadata
    async fn upload(
        &self,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> Result<(), GalleryError>;

    /// Delete an object
    async fn delete(&self, name: &str) -> Result<(), GalleryError>;
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory ObjectStore used across service tests.

    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Clone, Default)]
    pub struct FakeObject {
        pub bytes: Vec<u8>,
        pub content_type: Option<String>,
        pub updated: Option<DateTime<Utc>>,
        pub metadata: HashMap<String, String>,
    }

    /// Deterministic in-memory store with per-operation call counters
    /// and failure switches.
    #[derive(Default)]
    pub struct FakeObjectStore {
        pub objects: Mutex<BTreeMap<String, FakeObject>>,
        pub fail_listing: AtomicBool,
        pub fail_signing: AtomicBool,
        pub list_calls: AtomicUsize,
        pub sign_calls: AtomicUsize,
        pub download_calls: AtomicUsize,
        pub deleted: Mutex<Vec<String>>,
    }

    impl FakeObjectStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&self, name: &str, object: FakeObject) {
            self.objects
                .lock()
                .unwrap()
                .insert(name.to_string(), object);
        }

        pub fn insert_named(&self, name: &str) {
            self.insert(name, FakeObject::default());
        }
    }

    #[async_trait]
    impl ObjectStore for FakeObjectStore {
        async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectRecord>, GalleryError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);

            if self.fail_listing.load(Ordering::SeqCst) {
                return Err(GalleryError::StorageError("bucket unreachable".to_string()));
            }

            let objects = self.objects.lock().unwrap();
            Ok(objects
                .iter()
                .filter(|(name, _)| name.starts_with(prefix))
                .map(|(name, object)| ObjectRecord {
                    name: name.clone(),
                    size: object.bytes.len() as u64,
                    content_type: object.content_type.clone(),
                    updated: object.updated,
                    metadata: object.metadata.clone(),
                })
                .collect())
        }

        async fn signed_url(&self, name: &str, _ttl: Duration) -> Result<String, GalleryError> {
            self.sign_calls.fetch_add(1, Ordering::SeqCst);

            if self.fail_signing.load(Ordering::SeqCst) {
                return Err(GalleryError::StorageError("signing failed".to_string()));
            }

            Ok(format!("https://signed.example/{}", name))
        }

        fn public_url(&self, name: &str) -> String {
            format!("https://public.example/{}", name)
        }

        async fn download(&self, name: &str) -> Result<Vec<u8>, GalleryError> {
            self.download_calls.fetch_add(1, Ordering::SeqCst);

            self.objects
                .lock()
                .unwrap()
                .get(name)
                .map(|o| o.bytes.clone())
                .ok_or_else(|| GalleryError::NotFound(name.to_string()))
        }

        async fn upload(
            &self,
            name: &str,
            bytes: Vec<u8>,
            content_type: &str,
            metadata: HashMap<String, String>,
        ) -> Result<(), GalleryError> {
            self.objects.lock().unwrap().insert(
                name.to_string(),
                FakeObject {
                    bytes,
                    content_type: Some(content_type.to_string()),
                    updated: Some(Utc::now()),
                    metadata,
                },
            );
            Ok(())
        }

        async fn delete(&self, name: &str) -> Result<(), GalleryError> {
            self.objects.lock().unwrap().remove(name);
            self.deleted.lock().unwrap().push(name.to_string());
            Ok(())
        }
    }
}
