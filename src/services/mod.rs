// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod blob_cache;
pub mod cache;
pub mod filename;
pub mod flickr;
pub mod mailer;
pub mod photo_library;
pub mod photo_service;
pub mod pricing;
pub mod resize_job;
pub mod telemetry;

pub use blob_cache::BlobCache;
pub use cache::{photo_cache_key, sanitize_key, start_cleanup_task, MemoryCache, MemoryPhotoCache, PhotoCache};
pub use flickr::{FlickrClient, FlickrSearchResponse, FlickrService, SearchOptions, TagSearchClient};
pub use mailer::{Mailer, NoopMailer, SmtpMailer};
pub use photo_library::PhotoLibrary;
pub use photo_service::{ListOptions, OrderBy, OrderDirection, PhotoService};
pub use pricing::{adjust_price, CpiClient, PricingService};
pub use resize_job::{ResizeJob, ResizeSummary};
pub use telemetry::{ErrorReporter, LogReporter};
