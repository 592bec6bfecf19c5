// src/services/photo_library.rs
// DOCUMENTATION: Two-tier cached photo retrieval
// PURPOSE: Serve gallery listings from memory, blob cache, or the bucket

use crate::models::Photo;
use crate::services::cache::{photo_cache_key, PhotoCache};
use crate::services::photo_service::{order_photos, ListOptions, PhotoService};
use std::sync::Arc;

/// Orchestrates the fast in-memory tier, the durable blob tier, and the
/// origin bucket. Cache failures never fail a request; the next tier is
/// tried instead.
pub struct PhotoLibrary {
    fast: Arc<dyn PhotoCache>,
    durable: Arc<dyn PhotoCache>,
    photos: Arc<PhotoService>,
    cache_ttl: u64,
}

impl PhotoLibrary {
    pub fn new(
        fast: Arc<dyn PhotoCache>,
        durable: Arc<dyn PhotoCache>,
        photos: Arc<PhotoService>,
        cache_ttl: u64,
    ) -> Self {
        Self {
            fast,
            durable,
            photos,
            cache_ttl,
        }
    }

    /// Fetch photos for a prefix, consulting the full listing key first so
    /// a cached complete listing can serve any smaller limit by slicing.
    /// Ordering is applied per request, even over cached listings.
    pub async fn get_photos(&self, prefix: &str, options: &ListOptions) -> Option<Vec<Photo>> {
        let effective_limit = options.limit.filter(|n| *n > 0);

        let full_key = photo_cache_key(prefix, None);
        if let Some(mut photos) = self.retrieve_from_cache(&full_key).await {
            log::info!("Serving {} from cached full listing", prefix);
            order_photos(&mut photos, options.order_by, options.order_direction);
            if let Some(n) = effective_limit {
                photos.truncate(n as usize);
            }
            return Some(photos);
        }

        let fetch_key = photo_cache_key(prefix, effective_limit);
        if fetch_key != full_key {
            if let Some(mut photos) = self.retrieve_from_cache(&fetch_key).await {
                log::info!("Serving {} from cached limited listing", prefix);
                order_photos(&mut photos, options.order_by, options.order_direction);
                return Some(photos);
            }
        }

        let options = ListOptions {
            limit: effective_limit,
            ..options.clone()
        };
        let photos = self.photos.list_photos(prefix, &options).await?;

        if !photos.is_empty() {
            self.store(&fetch_key, &photos).await;
        }

        Some(photos)
    }

    /// Check the fast tier, then the durable tier. A durable hit backfills
    /// the fast tier before returning so the next request is a memory hit.
    async fn retrieve_from_cache(&self, key: &str) -> Option<Vec<Photo>> {
        match self.fast.get(key).await {
            Ok(Some(photos)) => return Some(Self::prune_invalid(photos)),
            Ok(None) => {}
            Err(e) => log::warn!("Fast cache read failed for {}: {}", key, e),
        }

        match self.durable.get(key).await {
            Ok(Some(photos)) => {
                let photos = Self::prune_invalid(photos);
                if let Err(e) = self.fast.set(key, &photos, self.cache_ttl).await {
                    log::warn!("Fast cache backfill failed for {}: {}", key, e);
                }
                Some(photos)
            }
            Ok(None) => None,
            Err(e) => {
                log::warn!("Blob cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    async fn store(&self, key: &str, photos: &[Photo]) {
        if let Err(e) = self.fast.set(key, photos, self.cache_ttl).await {
            log::warn!("Fast cache write failed for {}: {}", key, e);
        }
        if let Err(e) = self.durable.set(key, photos, self.cache_ttl).await {
            log::warn!("Blob cache write failed for {}: {}", key, e);
        }
    }

    /// Drop cached entries whose URL points at a folder rather than an
    /// object; stale cache blobs have carried these before.
    fn prune_invalid(photos: Vec<Photo>) -> Vec<Photo> {
        photos
            .into_iter()
            .filter(|p| {
                let url = &p.url_original;
                !(url.ends_with('/') || url.ends_with("%2F"))
            })
            .collect()
    }
}
