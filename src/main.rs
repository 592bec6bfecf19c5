// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, database, storage, and start HTTP server

mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod services;
mod storage;

use actix_web::{middleware::Logger, web, App, HttpServer};
use config::Config;
use dotenv::dotenv;
use services::{
    start_cleanup_task, BlobCache, CpiClient, FlickrClient, FlickrService, LogReporter, Mailer,
    MemoryCache, MemoryPhotoCache, NoopMailer, PhotoLibrary, PhotoService, ResizeJob, SmtpMailer,
};
use std::io;
use std::sync::Arc;
use storage::GcsObjectStore;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            &config.log_level
        } else {
            "info,actix_web=info,sqlx=warn"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    log::info!("Starting boudoir-gallery microservice...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Initialize database connection pool
    let pool = match config::init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    // 5. Object storage and error telemetry
    let store: Arc<dyn storage::ObjectStore> = Arc::new(GcsObjectStore::new(
        config.gcs_bucket.clone(),
        config.gcs_access_id.clone(),
        config.gcs_secret.clone(),
        config.gcs_api_token.clone(),
    ));
    if !config.has_signing_credentials() {
        log::warn!("Serving public URLs only (no signing credentials)");
    }
    let reporter = Arc::new(LogReporter);

    // 6. Photo pipeline: lister + two cache tiers
    let photo_service = Arc::new(PhotoService::new(
        store.clone(),
        reporter.clone(),
        config.signed_url_ttl,
    ));
    let fast_cache = Arc::new(MemoryPhotoCache::new(config.photo_cache_ttl));
    let blob_cache = Arc::new(BlobCache::new(store.clone()));
    let library = Arc::new(PhotoLibrary::new(
        fast_cache.clone(),
        blob_cache,
        photo_service,
        config.photo_cache_ttl,
    ));

    // Background cleanup for the in-memory tier (runs every 5 minutes)
    start_cleanup_task(fast_cache, 300);
    log::info!(
        "Initialized photo caches (TTL: {}s, cleanup every 5 minutes)",
        config.photo_cache_ttl
    );

    // 7. Legacy tag-search fallback
    let flickr = Arc::new(FlickrService::new(
        Arc::new(FlickrClient::new(
            config.flickr_api_key.clone(),
            config.flickr_user_id.clone(),
        )),
        Arc::new(MemoryCache::new(86400)),
    ));

    // 8. Outbound email and batch re-encoder
    let mailer: Arc<dyn Mailer> = if config.smtp_user.is_empty() || config.smtp_pass.is_empty() {
        Arc::new(NoopMailer)
    } else {
        match SmtpMailer::new(
            &config.smtp_host,
            config.smtp_user.clone(),
            config.smtp_pass.clone(),
        ) {
            Ok(mailer) => Arc::new(mailer),
            Err(e) => {
                log::error!("SMTP transport setup failed, emails disabled: {}", e);
                Arc::new(NoopMailer)
            }
        }
    };
    let resize_job = Arc::new(ResizeJob::new(
        store,
        mailer.clone(),
        config.cron_notification_email.clone(),
    ));
    let cpi_client = Arc::new(CpiClient::new());

    // 9. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let config_clone = config.clone();

    HttpServer::new(move || {
        App::new()
            // Application state (database pool, config, and collaborators)
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config_clone.clone()))
            .app_data(web::Data::new(library.clone()))
            .app_data(web::Data::new(flickr.clone()))
            .app_data(web::Data::new(resize_job.clone()))
            .app_data(web::Data::new(cpi_client.clone()))
            .app_data(web::Data::new(mailer.clone()))
            // Middleware
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            // Routes
            .configure(handlers::health_config)
            .configure(handlers::photos_config)
            .configure(handlers::cron_config)
            .configure(handlers::testimonials_config)
            .configure(handlers::pricing_config)
    })
    .bind(&server_addr)?
    .run()
    .await
}
