// src/handlers/cron.rs
// DOCUMENTATION: HTTP handler for scheduled maintenance jobs
// PURPOSE: Run the image re-encode batch under a wall-clock budget

use crate::config::Config;
use crate::services::ResizeJob;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// GET /api/cron/resize-images
/// Per-file errors land in the 200 summary; only a fatal listing failure
/// or an exceeded time budget maps to 500.
pub async fn resize_images(
    job: web::Data<Arc<ResizeJob>>,
    config: web::Data<Config>,
) -> impl Responder {
    let budget = Duration::from_secs(config.cron_max_duration);

    match tokio::time::timeout(budget, job.run()).await {
        Ok(Ok(summary)) => HttpResponse::Ok().json(summary),
        Ok(Err(e)) => {
            log::error!("Image re-encode batch failed: {}", e);
            HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))
        }
        Err(_) => {
            log::error!(
                "Image re-encode batch exceeded its {}s budget",
                config.cron_max_duration
            );
            HttpResponse::InternalServerError().json(json!({
                "error": format!("job exceeded {}s budget", config.cron_max_duration)
            }))
        }
    }
}

/// Configuration for cron routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/cron").route("/resize-images", web::get().to(resize_images)),
    );
}
