// src/models/photo.rs
// DOCUMENTATION: Canonical photo model returned to every page
// PURPOSE: One shape for photos regardless of origin (object storage or legacy API)

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Single rendition inside a responsive srcSet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoSource {
    pub src: String,
    pub width: i64,
    pub height: i64,
    pub title: String,
    pub description: String,
}

/// The canonical unit returned to every gallery page
/// DOCUMENTATION: Immutable once constructed; never emitted partially filled.
/// Objects whose id cannot be derived are dropped at the mapping stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub tags: String,
    pub date_taken: DateTime<Utc>,
    pub date_upload: DateTime<Utc>,
    /// String-encoded pixel dimensions, "0" when unknown
    pub width: String,
    pub height: String,
    pub views: i64,
    pub url_crop: String,
    pub url_large: String,
    pub url_medium: String,
    pub url_normal: String,
    pub url_original: String,
    pub url_small: String,
    pub url_thumbnail: String,
    pub url_zoom: String,
    pub src_set: Vec<PhotoSource>,
}

impl Photo {
    /// Timestamp fallback when no usable date metadata exists
    pub fn epoch() -> DateTime<Utc> {
        Utc.timestamp_opt(0, 0).single().unwrap_or_else(Utc::now)
    }

    /// Build a photo whose eight URL fields all collapse to one resolved URL.
    /// This is the object-storage path; the legacy API path fills each
    /// rendition separately.
    #[allow(clippy::too_many_arguments)]
    pub fn from_single_url(
        id: i64,
        title: String,
        description: String,
        tags: String,
        date_upload: DateTime<Utc>,
        width: String,
        height: String,
        views: i64,
        url: String,
    ) -> Self {
        let src_width = width.parse::<i64>().unwrap_or(0);
        let src_height = height.parse::<i64>().unwrap_or(0);

        Photo {
            id,
            title: title.clone(),
            description: description.clone(),
            tags,
            date_taken: date_upload,
            date_upload,
            width,
            height,
            views,
            url_crop: url.clone(),
            url_large: url.clone(),
            url_medium: url.clone(),
            url_normal: url.clone(),
            url_original: url.clone(),
            url_small: url.clone(),
            url_thumbnail: url.clone(),
            url_zoom: url.clone(),
            src_set: vec![PhotoSource {
                src: url,
                width: src_width,
                height: src_height,
                title,
                description,
            }],
        }
    }

    /// Fixed placeholder set used when photo retrieval fails entirely,
    /// keeping gallery pages renderable instead of erroring
    pub fn placeholders() -> Vec<Photo> {
        (1..=3)
            .map(|n| {
                Photo::from_single_url(
                    n,
                    format!("Placeholder {}", n),
                    String::new(),
                    String::new(),
                    Photo::epoch(),
                    "0".to_string(),
                    "0".to_string(),
                    0,
                    format!("/images/placeholder-{}.webp", n),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_url_collapses_all_renditions() {
        let photo = Photo::from_single_url(
            42,
            "Title".to_string(),
            "Desc".to_string(),
            "tags".to_string(),
            Photo::epoch(),
            "800".to_string(),
            "600".to_string(),
            7,
            "https://example.com/p.webp".to_string(),
        );

        assert_eq!(photo.url_crop, photo.url_original);
        assert_eq!(photo.url_thumbnail, "https://example.com/p.webp");
        assert_eq!(photo.src_set.len(), 1);
        assert_eq!(photo.src_set[0].width, 800);
        assert_eq!(photo.src_set[0].height, 600);
    }

    #[test]
    fn test_serializes_with_camel_case_fields() {
        let photo = Photo::from_single_url(
            1,
            "T".to_string(),
            String::new(),
            String::new(),
            Photo::epoch(),
            "0".to_string(),
            "0".to_string(),
            0,
            "u".to_string(),
        );

        let json = serde_json::to_value(&photo).unwrap();
        assert!(json.get("dateUpload").is_some());
        assert!(json.get("urlThumbnail").is_some());
        assert!(json.get("srcSet").is_some());
    }

    #[test]
    fn test_placeholders_are_non_empty() {
        let placeholders = Photo::placeholders();
        assert_eq!(placeholders.len(), 3);
        assert!(placeholders.iter().all(|p| !p.src_set.is_empty()));
    }
}
