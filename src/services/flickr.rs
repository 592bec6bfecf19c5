// src/services/flickr.rs
// DOCUMENTATION: Tag-based photo search backed by the Flickr REST API
// PURPOSE: Search photos by tags with exclusions, caching, and graceful failure

use crate::errors::GalleryError;
use crate::models::{Photo, PhotoSource};
use crate::services::cache::MemoryCache;
use async_trait::async_trait;
use chrono::{NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const FLICKR_REST_URL: &str = "https://api.flickr.com/services/rest";
const SEARCH_CACHE_TTL_SECONDS: u64 = 86400;
const DEFAULT_RESULT_LIMIT: usize = 9;

const SEARCH_EXTRAS: &str = "date_taken,date_upload,views,description,tags,\
url_t,url_s,url_m,url_n,url_l,url_o,url_z,url_c";

/// Raw photo entry as returned by `flickr.photos.search`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlickrPhoto {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub datetaken: String,
    #[serde(default)]
    pub dateupload: String,
    #[serde(default)]
    pub views: String,
    #[serde(default)]
    pub description: FlickrDescription,
    pub url_t: Option<String>,
    pub url_s: Option<String>,
    pub url_m: Option<String>,
    pub url_n: Option<String>,
    pub url_l: Option<String>,
    pub url_o: Option<String>,
    pub url_z: Option<String>,
    pub url_c: Option<String>,
    #[serde(default, deserialize_with = "dimension")]
    pub width_t: Option<i64>,
    #[serde(default, deserialize_with = "dimension")]
    pub height_t: Option<i64>,
    #[serde(default, deserialize_with = "dimension")]
    pub width_s: Option<i64>,
    #[serde(default, deserialize_with = "dimension")]
    pub height_s: Option<i64>,
    #[serde(default, deserialize_with = "dimension")]
    pub width_m: Option<i64>,
    #[serde(default, deserialize_with = "dimension")]
    pub height_m: Option<i64>,
    #[serde(default, deserialize_with = "dimension")]
    pub width_n: Option<i64>,
    #[serde(default, deserialize_with = "dimension")]
    pub height_n: Option<i64>,
    #[serde(default, deserialize_with = "dimension")]
    pub width_l: Option<i64>,
    #[serde(default, deserialize_with = "dimension")]
    pub height_l: Option<i64>,
    #[serde(default, deserialize_with = "dimension")]
    pub width_o: Option<i64>,
    #[serde(default, deserialize_with = "dimension")]
    pub height_o: Option<i64>,
    #[serde(default, deserialize_with = "dimension")]
    pub width_z: Option<i64>,
    #[serde(default, deserialize_with = "dimension")]
    pub height_z: Option<i64>,
    #[serde(default, deserialize_with = "dimension")]
    pub width_c: Option<i64>,
    #[serde(default, deserialize_with = "dimension")]
    pub height_c: Option<i64>,
}

/// Flickr sends per-size dimensions as strings (`"width_t": "100"`), but
/// some endpoints emit bare numbers. Accept both.
fn dimension<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.parse().ok(),
        None => None,
    })
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlickrDescription {
    #[serde(rename = "_content", default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    photos: Option<SearchPage>,
    stat: String,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    photo: Vec<FlickrPhoto>,
}

/// Response shape for the search endpoint; failures are reported in-band
/// rather than through HTTP status codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlickrSearchResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<Photo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Seam over the upstream tag search so the service can be tested
/// without network access.
#[async_trait]
pub trait TagSearchClient: Send + Sync {
    async fn search(&self, tags: &str) -> Result<Vec<FlickrPhoto>, GalleryError>;
}

/// Flickr REST client for `flickr.photos.search`
pub struct FlickrClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    user_id: String,
}

impl FlickrClient {
    pub fn new(api_key: String, user_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: FLICKR_REST_URL.to_string(),
            api_key,
            user_id,
        }
    }
}

#[async_trait]
impl TagSearchClient for FlickrClient {
    async fn search(&self, tags: &str) -> Result<Vec<FlickrPhoto>, GalleryError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("method", "flickr.photos.search"),
                ("api_key", &self.api_key),
                ("user_id", &self.user_id),
                ("tags", tags),
                ("tag_mode", "any"),
                ("sort", "interestingness-desc"),
                ("safe_search", "3"),
                ("content_types", "0"),
                ("media", "photos"),
                ("extras", SEARCH_EXTRAS),
                ("format", "json"),
                ("nojsoncallback", "1"),
            ])
            .send()
            .await
            .map_err(|e| GalleryError::ExternalApiError(format!("Flickr request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(GalleryError::ExternalApiError(format!(
                "Flickr returned status {}",
                response.status()
            )));
        }

        let envelope: SearchEnvelope = response
            .json()
            .await
            .map_err(|e| GalleryError::ExternalApiError(format!("Invalid Flickr response: {}", e)))?;

        if envelope.stat != "ok" {
            return Err(GalleryError::ExternalApiError(format!(
                "Flickr error: {}",
                envelope.message.unwrap_or_else(|| envelope.stat.clone())
            )));
        }

        Ok(envelope.photos.map(|p| p.photo).unwrap_or_default())
    }
}

/// Per-request presentation options for a tag search
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    /// Maximum photos to return (default 9)
    pub items: Option<usize>,
    /// Sort by capture date, newest first
    pub order_by_date: bool,
    /// Sort by view count, most viewed first; wins over `order_by_date`
    pub order_by_views: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            items: None,
            order_by_date: false,
            order_by_views: false,
        }
    }
}

/// Tag search with a 24h cache and stale-while-revalidate refresh
pub struct FlickrService {
    client: Arc<dyn TagSearchClient>,
    cache: Arc<MemoryCache>,
}

impl FlickrService {
    pub fn new(client: Arc<dyn TagSearchClient>, cache: Arc<MemoryCache>) -> Self {
        Self { client, cache }
    }

    /// Search by a comma-separated tag expression. Tags prefixed with `-`
    /// exclude any photo carrying that tag. A cache hit is returned
    /// immediately while a background task refreshes the entry.
    pub async fn search_photos(&self, tags: &str, options: SearchOptions) -> FlickrSearchResponse {
        let cache_key = format!("flickr-search-{}", tags);

        if let Some(cached) = self.cache.get(&cache_key).await {
            if let Ok(photos) = serde_json::from_str::<Vec<Photo>>(&cached) {
                log::info!("Serving Flickr search '{}' from cache", tags);
                self.spawn_refresh(tags.to_string(), cache_key);
                return FlickrSearchResponse {
                    success: true,
                    photos: Some(Self::present(photos, options)),
                    reason: None,
                };
            }
        }

        match self.fetch_and_cache(tags, &cache_key).await {
            Ok(photos) if !photos.is_empty() => FlickrSearchResponse {
                success: true,
                photos: Some(Self::present(photos, options)),
                reason: None,
            },
            Ok(_) => FlickrSearchResponse {
                success: false,
                photos: None,
                reason: Some(format!("No photos found for tags '{}'", tags)),
            },
            Err(e) => {
                log::error!("Flickr search for '{}' failed: {}", tags, e);
                FlickrSearchResponse {
                    success: false,
                    photos: None,
                    reason: Some(e.to_string()),
                }
            }
        }
    }

    async fn fetch_and_cache(
        &self,
        tags: &str,
        cache_key: &str,
    ) -> Result<Vec<Photo>, GalleryError> {
        let (included, excluded) = split_tags(tags);
        let raw = self.client.search(&included).await?;
        let photos = process_photos(raw, &excluded);

        if !photos.is_empty() {
            if let Ok(json) = serde_json::to_string(&photos) {
                self.cache
                    .set_with_ttl(
                        cache_key.to_string(),
                        json,
                        std::time::Duration::from_secs(SEARCH_CACHE_TTL_SECONDS),
                    )
                    .await;
            }
        }

        Ok(photos)
    }

    fn spawn_refresh(&self, tags: String, cache_key: String) {
        let client = self.client.clone();
        let cache = self.cache.clone();
        tokio::spawn(async move {
            let (included, excluded) = split_tags(&tags);
            match client.search(&included).await {
                Ok(raw) => {
                    let photos = process_photos(raw, &excluded);
                    if photos.is_empty() {
                        return;
                    }
                    if let Ok(json) = serde_json::to_string(&photos) {
                        cache
                            .set_with_ttl(
                                cache_key,
                                json,
                                std::time::Duration::from_secs(SEARCH_CACHE_TTL_SECONDS),
                            )
                            .await;
                        log::debug!("Refreshed Flickr cache for '{}'", tags);
                    }
                }
                Err(e) => log::warn!("Background Flickr refresh for '{}' failed: {}", tags, e),
            }
        });
    }

    /// Order and cap a cached listing per request. Without an ordering
    /// flag the upstream `interestingness-desc` order is preserved.
    fn present(mut photos: Vec<Photo>, options: SearchOptions) -> Vec<Photo> {
        if options.order_by_views {
            photos.sort_by(|a, b| b.views.cmp(&a.views).then(b.date_taken.cmp(&a.date_taken)));
        } else if options.order_by_date {
            photos.sort_by(|a, b| b.date_taken.cmp(&a.date_taken).then(b.views.cmp(&a.views)));
        }
        photos.truncate(options.items.unwrap_or(DEFAULT_RESULT_LIMIT));
        photos
    }
}

/// Split a comma-separated tag expression into the tags to send upstream
/// and the exclusion tags written with a `-` prefix.
pub fn split_tags(tags: &str) -> (String, Vec<String>) {
    let mut included = Vec::new();
    let mut excluded = Vec::new();

    for tag in tags.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if let Some(stripped) = tag.strip_prefix('-') {
            if !stripped.is_empty() {
                excluded.push(stripped.to_lowercase());
            }
        } else {
            included.push(tag.to_string());
        }
    }

    (included.join(","), excluded)
}

/// Apply client-side exclusions and map to the domain model; ordering and
/// truncation are per-request concerns.
fn process_photos(raw: Vec<FlickrPhoto>, excluded: &[String]) -> Vec<Photo> {
    raw
        .into_iter()
        .filter(|p| {
            let photo_tags: Vec<String> = p
                .tags
                .split(' ')
                .filter(|t| !t.is_empty())
                .map(str::to_lowercase)
                .collect();
            !excluded.iter().any(|e| photo_tags.contains(e))
        })
        .map(map_photo)
        .collect()
}

fn map_photo(raw: FlickrPhoto) -> Photo {
    let date_taken = NaiveDateTime::parse_from_str(&raw.datetaken, "%Y-%m-%d %H:%M:%S")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .unwrap_or_else(|_| Photo::epoch());

    let date_upload = raw
        .dateupload
        .parse::<i64>()
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .unwrap_or_else(Photo::epoch);

    let best = |candidates: &[&Option<String>]| -> String {
        candidates
            .iter()
            .find_map(|c| (*c).clone())
            .unwrap_or_default()
    };

    let url_thumbnail = best(&[&raw.url_t, &raw.url_s]);
    let url_small = best(&[&raw.url_s, &raw.url_m]);
    let url_medium = best(&[&raw.url_m, &raw.url_n]);
    let url_normal = best(&[&raw.url_n, &raw.url_m]);
    let url_large = best(&[&raw.url_l, &raw.url_o]);
    let url_original = best(&[&raw.url_o, &raw.url_l]);
    let url_zoom = best(&[&raw.url_z, &raw.url_l]);
    let url_crop = best(&[&raw.url_c, &raw.url_l]);

    let rendition = |url: &str, width: Option<i64>, height: Option<i64>| PhotoSource {
        src: url.to_string(),
        width: width.unwrap_or(0),
        height: height.unwrap_or(0),
        title: raw.title.clone(),
        description: raw.description.content.clone(),
    };

    let src_set = vec![
        rendition(&url_thumbnail, raw.width_t, raw.height_t),
        rendition(&url_small, raw.width_s, raw.height_s),
        rendition(&url_medium, raw.width_m, raw.height_m),
        rendition(&url_normal, raw.width_n, raw.height_n),
        rendition(&url_large, raw.width_l, raw.height_l),
        rendition(&url_original, raw.width_o, raw.height_o),
        rendition(&url_zoom, raw.width_z, raw.height_z),
        rendition(&url_crop, raw.width_c, raw.height_c),
    ];

    Photo {
        id: raw.id.parse().unwrap_or(0),
        title: raw.title,
        description: raw.description.content,
        tags: raw.tags,
        date_taken,
        date_upload,
        width: raw.width_o.map(|w| w.to_string()).unwrap_or_else(|| "0".to_string()),
        height: raw
            .height_o
            .map(|h| h.to_string())
            .unwrap_or_else(|| "0".to_string()),
        views: raw.views.parse().unwrap_or(0),
        url_crop,
        url_large,
        url_medium,
        url_normal,
        url_original,
        url_small,
        url_thumbnail,
        url_zoom,
        src_set,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeSearchClient {
        photos: Mutex<Result<Vec<FlickrPhoto>, String>>,
        calls: AtomicUsize,
    }

    impl FakeSearchClient {
        fn returning(photos: Vec<FlickrPhoto>) -> Self {
            Self {
                photos: Mutex::new(Ok(photos)),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(reason: &str) -> Self {
            Self {
                photos: Mutex::new(Err(reason.to_string())),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TagSearchClient for FakeSearchClient {
        async fn search(&self, _tags: &str) -> Result<Vec<FlickrPhoto>, GalleryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &*self.photos.lock().unwrap() {
                Ok(photos) => Ok(photos.clone()),
                Err(reason) => Err(GalleryError::ExternalApiError(reason.clone())),
            }
        }
    }

    fn flickr_photo(id: &str, tags: &str) -> FlickrPhoto {
        FlickrPhoto {
            id: id.to_string(),
            title: format!("Photo {}", id),
            tags: tags.to_string(),
            datetaken: "2024-06-01 12:00:00".to_string(),
            dateupload: "1717243200".to_string(),
            views: "10".to_string(),
            description: FlickrDescription::default(),
            url_t: Some(format!("https://flickr.example/{}_t.jpg", id)),
            url_s: None,
            url_m: Some(format!("https://flickr.example/{}_m.jpg", id)),
            url_n: None,
            url_l: Some(format!("https://flickr.example/{}_l.jpg", id)),
            url_o: Some(format!("https://flickr.example/{}_o.jpg", id)),
            url_z: None,
            url_c: None,
            width_t: Some(100),
            height_t: Some(67),
            width_s: None,
            height_s: None,
            width_m: Some(500),
            height_m: Some(333),
            width_n: None,
            height_n: None,
            width_l: Some(1024),
            height_l: Some(683),
            width_o: Some(2560),
            height_o: Some(1707),
            width_z: None,
            height_z: None,
            width_c: None,
            height_c: None,
        }
    }

    #[test]
    fn test_split_tags_separates_exclusions() {
        let (included, excluded) = split_tags("boudoir, -nsfw, lingerie, -Private");

        assert_eq!(included, "boudoir,lingerie");
        assert_eq!(excluded, vec!["nsfw".to_string(), "private".to_string()]);
    }

    #[test]
    fn test_excluded_tags_filter_photos_case_insensitively() {
        let raw = vec![
            flickr_photo("1", "test good"),
            flickr_photo("2", "test Bad"),
            flickr_photo("3", "test exclude"),
        ];
        let (_, excluded) = split_tags("test,-bad,-exclude");

        let photos = process_photos(raw, &excluded);

        assert_eq!(photos.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1]);
    }

    #[tokio::test]
    async fn test_result_list_is_capped() {
        let raw: Vec<FlickrPhoto> = (0..20)
            .map(|n| flickr_photo(&n.to_string(), "boudoir"))
            .collect();
        let client = Arc::new(FakeSearchClient::returning(raw));
        let service = FlickrService::new(client, Arc::new(MemoryCache::new(60)));

        let response = service
            .search_photos("boudoir", SearchOptions::default())
            .await;

        assert_eq!(response.photos.unwrap().len(), DEFAULT_RESULT_LIMIT);
    }

    #[test]
    fn test_wire_payload_with_string_dimensions_parses() {
        let payload = r#"{
            "photos": {
                "page": 1,
                "pages": 1,
                "perpage": 100,
                "total": 1,
                "photo": [{
                    "id": "53214491776",
                    "owner": "200398884@N05",
                    "secret": "0d9e74e64e",
                    "title": "Window light",
                    "ispublic": 1,
                    "datetaken": "2024-06-01 12:00:00",
                    "dateupload": "1717243200",
                    "views": "128",
                    "tags": "boudoir window",
                    "description": { "_content": "Soft morning set" },
                    "url_t": "https://live.staticflickr.com/x_t.jpg",
                    "width_t": "100",
                    "height_t": "67",
                    "url_o": "https://live.staticflickr.com/x_o.jpg",
                    "width_o": "2560",
                    "height_o": 1707
                }]
            },
            "stat": "ok"
        }"#;

        let envelope: SearchEnvelope = serde_json::from_str(payload).unwrap();
        let raw = envelope.photos.unwrap().photo;
        assert_eq!(raw[0].width_t, Some(100));
        assert_eq!(raw[0].height_o, Some(1707));

        let photos = process_photos(raw, &[]);
        assert_eq!(photos[0].width, "2560");
        assert_eq!(photos[0].src_set[0].width, 100);
        assert_eq!(photos[0].views, 128);
    }

    #[tokio::test]
    async fn test_default_search_preserves_upstream_order() {
        let mut first = flickr_photo("1", "boudoir");
        first.datetaken = "2020-01-01 00:00:00".to_string();
        first.views = "1".to_string();
        let mut second = flickr_photo("2", "boudoir");
        second.datetaken = "2024-06-01 12:00:00".to_string();
        second.views = "99".to_string();
        let client = Arc::new(FakeSearchClient::returning(vec![first, second]));
        let service = FlickrService::new(client, Arc::new(MemoryCache::new(60)));

        let response = service
            .search_photos("boudoir", SearchOptions::default())
            .await;

        let ids: Vec<i64> = response.photos.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_order_by_date_sorts_newest_first() {
        let mut old = flickr_photo("1", "boudoir");
        old.datetaken = "2020-01-01 00:00:00".to_string();
        let recent = flickr_photo("2", "boudoir");
        let client = Arc::new(FakeSearchClient::returning(vec![old, recent]));
        let service = FlickrService::new(client, Arc::new(MemoryCache::new(60)));

        let response = service
            .search_photos(
                "boudoir",
                SearchOptions {
                    order_by_date: true,
                    ..Default::default()
                },
            )
            .await;

        let ids: Vec<i64> = response.photos.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_mapping_fills_renditions_and_srcset() {
        let photos = process_photos(vec![flickr_photo("42", "boudoir")], &[]);

        let photo = &photos[0];
        assert_eq!(photo.id, 42);
        assert_eq!(photo.url_original, "https://flickr.example/42_o.jpg");
        assert_eq!(photo.url_small, "https://flickr.example/42_m.jpg");
        assert_eq!(photo.width, "2560");
        assert_eq!(photo.src_set.len(), 8);
        assert_eq!(photo.src_set[0].width, 100);
    }

    #[tokio::test]
    async fn test_search_failure_yields_typed_response() {
        let client = Arc::new(FakeSearchClient::failing("rate limited"));
        let service = FlickrService::new(client, Arc::new(MemoryCache::new(60)));

        let response = service.search_photos("boudoir", SearchOptions::default()).await;

        assert!(!response.success);
        assert!(response.photos.is_none());
        assert!(response.reason.unwrap().contains("rate limited"));
    }

    #[tokio::test]
    async fn test_empty_result_yields_typed_response() {
        let client = Arc::new(FakeSearchClient::returning(vec![]));
        let service = FlickrService::new(client, Arc::new(MemoryCache::new(60)));

        let response = service.search_photos("nothing", SearchOptions::default()).await;

        assert!(!response.success);
        assert!(response.reason.unwrap().contains("nothing"));
    }

    #[tokio::test]
    async fn test_successful_search_populates_cache() {
        let client = Arc::new(FakeSearchClient::returning(vec![flickr_photo(
            "7", "boudoir",
        )]));
        let cache = Arc::new(MemoryCache::new(60));
        let service = FlickrService::new(client.clone(), cache.clone());

        let response = service.search_photos("boudoir", SearchOptions::default()).await;

        assert!(response.success);
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        assert!(cache.get("flickr-search-boudoir").await.is_some());
    }
}
