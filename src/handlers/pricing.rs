// src/handlers/pricing.rs
// DOCUMENTATION: HTTP handlers for pricing packages
// PURPOSE: Expose the current pricing record and the guarded recalculation

use crate::config::Config;
use crate::db::PricingRepository;
use crate::errors::GalleryError;
use crate::services::{CpiClient, Mailer, PricingService};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct RecalculateQuery {
    pub token: Option<String>,
}

/// GET /pricing
/// Latest pricing record or 404 when none has been inserted yet
pub async fn get_pricing(pool: web::Data<PgPool>) -> Result<impl Responder, GalleryError> {
    let record = PricingRepository::latest(pool.get_ref())
        .await?
        .ok_or_else(|| GalleryError::NotFound("no pricing record".to_string()))?;

    Ok(HttpResponse::Ok().json(record))
}

/// GET|POST /api/pricing/recalculate
/// Guarded by the shared cron secret, passed either as the `x-cron-secret`
/// header or a `token` query parameter.
pub async fn recalculate_pricing(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    cpi: web::Data<Arc<CpiClient>>,
    mailer: web::Data<Arc<dyn Mailer>>,
    query: web::Query<RecalculateQuery>,
) -> Result<impl Responder, GalleryError> {
    let secret = config.pricing_recalc_secret.as_str();
    if secret.is_empty() {
        return Err(GalleryError::ServiceUnavailable(
            "pricing recalculation is disabled".to_string(),
        ));
    }

    let presented = req
        .headers()
        .get("x-cron-secret")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| query.token.clone());

    if presented.as_deref() != Some(secret) {
        return Err(GalleryError::Unauthorized);
    }

    let outcome = PricingService::recalculate(
        pool.get_ref(),
        cpi.get_ref(),
        mailer.get_ref(),
        &config.cron_notification_email,
    )
    .await?;

    Ok(HttpResponse::Ok().json(outcome))
}

/// Configuration for pricing routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/pricing", web::get().to(get_pricing)).service(
        web::scope("/api/pricing")
            .route("/recalculate", web::get().to(recalculate_pricing))
            .route("/recalculate", web::post().to(recalculate_pricing)),
    );
}
