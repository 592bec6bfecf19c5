// src/services/photo_service.rs
// DOCUMENTATION: Photo listing service
// PURPOSE: Turn raw bucket listings into ordered, signed gallery photos

use crate::models::Photo;
use crate::services::filename::{extract_photo_id, extract_title};
use crate::services::telemetry::ErrorReporter;
use crate::storage::{ObjectRecord, ObjectStore};
use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;
use serde::Deserialize;
use std::sync::Arc;
use std::sync::LazyLock;
use std::time::Duration;

static IMAGE_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png|gif|webp|avif|tiff)$").unwrap());

/// Ordering criteria for a photo listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderBy {
    #[default]
    Date,
    Views,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Asc,
    #[default]
    Desc,
}

/// Options controlling a listing request
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Maximum number of photos to return; `None` or `Some(0)` means all
    pub limit: Option<u32>,
    pub order_by: OrderBy,
    pub order_direction: OrderDirection,
}

/// Lists a storage prefix and maps each image object into a `Photo`,
/// signing URLs only for the photos that survive ordering and truncation.
pub struct PhotoService {
    store: Arc<dyn ObjectStore>,
    reporter: Arc<dyn ErrorReporter>,
    signed_url_ttl: u64,
}

/// Intermediate record kept until ordering settles which photos get signed
struct ParsedObject {
    name: String,
    id: i64,
    title: String,
    description: String,
    tags: String,
    width: String,
    height: String,
    views: i64,
    date_upload: DateTime<Utc>,
}

/// Sort keys shared by the listing intermediates and the domain model so
/// both stages order identically.
trait SortKeys {
    fn sort_date(&self) -> DateTime<Utc>;
    fn sort_views(&self) -> i64;
    fn sort_name(&self) -> &str;
}

impl SortKeys for Photo {
    fn sort_date(&self) -> DateTime<Utc> {
        self.date_upload
    }
    fn sort_views(&self) -> i64 {
        self.views
    }
    fn sort_name(&self) -> &str {
        &self.title
    }
}

impl SortKeys for ParsedObject {
    fn sort_date(&self) -> DateTime<Utc> {
        self.date_upload
    }
    fn sort_views(&self) -> i64 {
        self.views
    }
    fn sort_name(&self) -> &str {
        &self.title
    }
}

fn sort_listing<T: SortKeys>(items: &mut [T], by: OrderBy, direction: OrderDirection) {
    items.sort_by(|a, b| {
        let ordering = match by {
            OrderBy::Date => a.sort_date().cmp(&b.sort_date()),
            OrderBy::Views => a.sort_views().cmp(&b.sort_views()),
            OrderBy::Name => a.sort_name().cmp(b.sort_name()),
        };
        match direction {
            OrderDirection::Asc => ordering,
            OrderDirection::Desc => ordering.reverse(),
        }
    });
}

/// Order photos in place. Also applied to cached listings, whose stored
/// order reflects whatever request populated them.
pub fn order_photos(photos: &mut [Photo], by: OrderBy, direction: OrderDirection) {
    sort_listing(photos, by, direction);
}

impl PhotoService {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        reporter: Arc<dyn ErrorReporter>,
        signed_url_ttl: u64,
    ) -> Self {
        Self {
            store,
            reporter,
            signed_url_ttl,
        }
    }

    /// List photos under a prefix. Returns `None` only when the listing
    /// itself fails; an empty prefix yields `Some(vec![])`.
    pub async fn list_photos(&self, prefix: &str, options: &ListOptions) -> Option<Vec<Photo>> {
        let records = match self.store.list_objects(prefix).await {
            Ok(records) => records,
            Err(e) => {
                log::error!("Failed to list photos under {}: {}", prefix, e);
                self.reporter.capture_exception(&e);
                return None;
            }
        };

        let mut parsed: Vec<ParsedObject> = records
            .iter()
            .filter(|r| !r.name.ends_with('/') && IMAGE_EXTENSION.is_match(&r.name))
            .filter_map(|r| Self::parse_object(r))
            .collect();

        sort_listing(&mut parsed, options.order_by, options.order_direction);

        if let Some(limit) = options.limit {
            if limit > 0 {
                parsed.truncate(limit as usize);
            }
        }

        let mut photos = Vec::with_capacity(parsed.len());
        for object in parsed {
            let url = self.resolve_url(&object.name).await;
            photos.push(Photo::from_single_url(
                object.id,
                object.title,
                object.description,
                object.tags,
                object.date_upload,
                object.width,
                object.height,
                object.views,
                url,
            ));
        }

        log::info!("Listed {} photos under {}", photos.len(), prefix);
        Some(photos)
    }

    fn parse_object(record: &ObjectRecord) -> Option<ParsedObject> {
        let filename = record.name.rsplit('/').next().unwrap_or(&record.name);

        let id = match extract_photo_id(filename) {
            Some(id) => id,
            None => {
                log::warn!("Skipping object without a photo id: {}", record.name);
                return None;
            }
        };

        let meta = |key: &str| record.metadata.get(key).cloned();

        let date_upload = meta("dateUploaded")
            .and_then(|raw| Self::parse_timestamp(&raw))
            .or(record.updated)
            .unwrap_or_else(Photo::epoch);

        Some(ParsedObject {
            name: record.name.clone(),
            id,
            title: extract_title(filename),
            description: meta("description")
                .or_else(|| meta("caption"))
                .unwrap_or_default(),
            tags: meta("tags").unwrap_or_default(),
            width: meta("width").unwrap_or_else(|| "0".to_string()),
            height: meta("height").unwrap_or_else(|| "0".to_string()),
            views: meta("views").and_then(|v| v.parse().ok()).unwrap_or(0),
            date_upload,
        })
    }

    fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        raw.parse::<i64>()
            .ok()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }

    /// Signed URL when credentials allow it, public URL otherwise
    async fn resolve_url(&self, name: &str) -> String {
        match self
            .store
            .signed_url(name, Duration::from_secs(self.signed_url_ttl))
            .await
        {
            Ok(url) => url,
            Err(e) => {
                log::warn!("Falling back to public URL for {}: {}", name, e);
                self.store.public_url(name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::telemetry::fake::CountingReporter;
    use crate::storage::object_store::fake::{FakeObject, FakeObjectStore};
    use std::sync::atomic::Ordering;

    fn service(store: Arc<FakeObjectStore>) -> (PhotoService, Arc<CountingReporter>) {
        let reporter = Arc::new(CountingReporter::new());
        (
            PhotoService::new(store, reporter.clone(), 3600),
            reporter,
        )
    }

    fn dated_object(seconds: i64) -> FakeObject {
        FakeObject {
            updated: Utc.timestamp_opt(seconds, 0).single(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_non_image_objects_are_filtered() {
        let store = Arc::new(FakeObjectStore::new());
        store.insert_named("boudoir/model-one_111_o.jpg");
        store.insert_named("boudoir/contract_222_o.pdf");
        store.insert_named("boudoir/nested/");
        let (service, _) = service(store);

        let photos = service
            .list_photos("boudoir/", &ListOptions::default())
            .await
            .unwrap();

        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].id, 111);
        assert_eq!(photos[0].title, "Model One");
    }

    #[tokio::test]
    async fn test_objects_without_ids_are_dropped() {
        let store = Arc::new(FakeObjectStore::new());
        store.insert_named("boudoir/anonymous-portrait.jpg");
        store.insert_named("boudoir/session_333_o.webp");
        let (service, _) = service(store);

        let photos = service
            .list_photos("boudoir/", &ListOptions::default())
            .await
            .unwrap();

        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].id, 333);
    }

    #[tokio::test]
    async fn test_empty_prefix_yields_some_empty() {
        let store = Arc::new(FakeObjectStore::new());
        let (service, _) = service(store);

        let photos = service
            .list_photos("empty/", &ListOptions::default())
            .await;

        assert_eq!(photos, Some(vec![]));
    }

    #[tokio::test]
    async fn test_listing_failure_is_reported_and_returns_none() {
        let store = Arc::new(FakeObjectStore::new());
        store.fail_listing.store(true, Ordering::SeqCst);
        let (service, reporter) = service(store);

        let photos = service
            .list_photos("boudoir/", &ListOptions::default())
            .await;

        assert_eq!(photos, None);
        assert_eq!(reporter.captured.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_signing_happens_only_for_photos_within_limit() {
        let store = Arc::new(FakeObjectStore::new());
        for n in 0..20 {
            store.insert(
                &format!("boudoir/shot-{:02}_{}_o.jpg", n, 1000 + n),
                dated_object(1_700_000_000 + n),
            );
        }
        let (service, _) = service(store.clone());

        let photos = service
            .list_photos(
                "boudoir/",
                &ListOptions {
                    limit: Some(5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(photos.len(), 5);
        assert_eq!(store.sign_calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_date_ordering_both_directions() {
        let store = Arc::new(FakeObjectStore::new());
        store.insert("boudoir/old_1_o.jpg", dated_object(1_000));
        store.insert("boudoir/new_3_o.jpg", dated_object(3_000));
        store.insert("boudoir/mid_2_o.jpg", dated_object(2_000));
        let (service, _) = service(store);

        let desc = service
            .list_photos("boudoir/", &ListOptions::default())
            .await
            .unwrap();
        assert_eq!(desc.iter().map(|p| p.id).collect::<Vec<_>>(), vec![3, 2, 1]);

        let asc = service
            .list_photos(
                "boudoir/",
                &ListOptions {
                    order_direction: OrderDirection::Asc,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(asc.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_order_photos_by_name_uses_same_comparator() {
        let make = |id: i64, title: &str| {
            Photo::from_single_url(
                id,
                title.to_string(),
                String::new(),
                String::new(),
                Photo::epoch(),
                "0".to_string(),
                "0".to_string(),
                0,
                String::new(),
            )
        };
        let mut photos = vec![make(1, "Window"), make(2, "Atelier"), make(3, "Mirror")];

        order_photos(&mut photos, OrderBy::Name, OrderDirection::Asc);

        assert_eq!(photos.iter().map(|p| p.id).collect::<Vec<_>>(), vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn test_signing_failure_falls_back_to_public_url() {
        let store = Arc::new(FakeObjectStore::new());
        store.insert_named("boudoir/fallback_9_o.jpg");
        store.fail_signing.store(true, Ordering::SeqCst);
        let (service, _) = service(store);

        let photos = service
            .list_photos("boudoir/", &ListOptions::default())
            .await
            .unwrap();

        assert_eq!(
            photos[0].url_original,
            "https://public.example/boudoir/fallback_9_o.jpg"
        );
    }

    #[tokio::test]
    async fn test_metadata_flows_into_photo_fields() {
        let store = Arc::new(FakeObjectStore::new());
        let mut object = dated_object(1_700_000_000);
        object
            .metadata
            .insert("description".to_string(), "Golden hour set".to_string());
        object
            .metadata
            .insert("tags".to_string(), "boudoir golden".to_string());
        object.metadata.insert("width".to_string(), "2560".to_string());
        object
            .metadata
            .insert("height".to_string(), "1707".to_string());
        object.metadata.insert("views".to_string(), "42".to_string());
        store.insert("boudoir/golden_7_o.jpg", object);
        let (service, _) = service(store);

        let photos = service
            .list_photos("boudoir/", &ListOptions::default())
            .await
            .unwrap();

        let photo = &photos[0];
        assert_eq!(photo.description, "Golden hour set");
        assert_eq!(photo.tags, "boudoir golden");
        assert_eq!(photo.width, "2560");
        assert_eq!(photo.height, "1707");
        assert_eq!(photo.views, 42);
    }
}
