// src/handlers/photos.rs
// DOCUMENTATION: HTTP handlers for photo retrieval
// PURPOSE: Parse requests, call the photo pipeline, return responses

use crate::errors::GalleryError;
use crate::models::Photo;
use crate::services::{
    FlickrService, ListOptions, OrderBy, OrderDirection, PhotoLibrary, SearchOptions,
};
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct GalleryQuery {
    /// Absent or empty lists the whole bucket
    #[validate(length(max = 200))]
    pub prefix: Option<String>,
    #[validate(range(min = 1, max = 500))]
    pub limit: Option<u32>,
    pub order_by: Option<OrderBy>,
    pub order_direction: Option<OrderDirection>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchQuery {
    #[validate(length(min = 1, max = 200))]
    pub tags: String,
    #[validate(range(min = 1, max = 50))]
    pub items: Option<usize>,
    #[serde(default)]
    pub order_by_date: bool,
    #[serde(default)]
    pub order_by_views: bool,
}

/// GET /photos
/// Two-tier cached gallery listing; a pipeline failure degrades to the
/// placeholder set instead of an error page.
pub async fn get_photos(
    library: web::Data<Arc<PhotoLibrary>>,
    query: web::Query<GalleryQuery>,
) -> Result<impl Responder, GalleryError> {
    if let Err(e) = query.validate() {
        return Err(GalleryError::ValidationError(e.to_string()));
    }

    let prefix = query.prefix.as_deref().unwrap_or("");
    let options = ListOptions {
        limit: query.limit,
        order_by: query.order_by.unwrap_or_default(),
        order_direction: query.order_direction.unwrap_or_default(),
    };
    let photos = match library.get_photos(prefix, &options).await {
        Some(photos) => photos,
        None => {
            log::warn!(
                "Photo pipeline unavailable for '{}'; serving placeholders",
                prefix
            );
            Photo::placeholders()
        }
    };

    Ok(HttpResponse::Ok().json(photos))
}

/// GET /photos/search
/// Legacy tag search; failures are reported in the body, always 200.
pub async fn search_photos(
    flickr: web::Data<Arc<FlickrService>>,
    query: web::Query<SearchQuery>,
) -> Result<impl Responder, GalleryError> {
    if let Err(e) = query.validate() {
        return Err(GalleryError::ValidationError(e.to_string()));
    }

    let response = flickr
        .search_photos(
            &query.tags,
            SearchOptions {
                items: query.items,
                order_by_date: query.order_by_date,
                order_by_views: query.order_by_views,
            },
        )
        .await;

    Ok(HttpResponse::Ok().json(response))
}

/// Configuration for photo routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/photos")
            .route("", web::get().to(get_photos))
            .route("/search", web::get().to(search_photos)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_prefix_lists_whole_bucket() {
        let query = web::Query::<GalleryQuery>::from_query("").unwrap();

        assert!(query.validate().is_ok());
        assert_eq!(query.prefix.as_deref().unwrap_or(""), "");
    }

    #[test]
    fn test_empty_prefix_passes_validation() {
        let query = web::Query::<GalleryQuery>::from_query("prefix=&limit=3").unwrap();

        assert!(query.validate().is_ok());
        assert_eq!(query.prefix.as_deref(), Some(""));
        assert_eq!(query.limit, Some(3));
    }

    #[test]
    fn test_gallery_ordering_params_parse() {
        let query = web::Query::<GalleryQuery>::from_query(
            "prefix=boudoir/&order_by=views&order_direction=asc",
        )
        .unwrap();

        assert_eq!(query.order_by, Some(OrderBy::Views));
        assert_eq!(query.order_direction, Some(OrderDirection::Asc));
    }

    #[test]
    fn test_search_ordering_flags_default_off() {
        let query = web::Query::<SearchQuery>::from_query("tags=boudoir").unwrap();

        assert!(!query.order_by_date);
        assert!(!query.order_by_views);
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        let query = web::Query::<GalleryQuery>::from_query("prefix=boudoir/&limit=0").unwrap();

        assert!(query.validate().is_err());
    }
}
