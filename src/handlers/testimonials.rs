// src/handlers/testimonials.rs
// DOCUMENTATION: HTTP handler for client testimonials
// PURPOSE: Serve the featured/others partition, degrading on DB failure

use crate::db::TestimonialRepository;
use crate::models::TestimonialGroups;
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;

/// GET /testimonials
/// A database failure degrades to empty groups so the page still renders.
pub async fn get_testimonials(pool: web::Data<PgPool>) -> impl Responder {
    let groups = match TestimonialRepository::get_published(pool.get_ref()).await {
        Ok(testimonials) => TestimonialGroups::partition(testimonials),
        Err(e) => {
            log::warn!("Serving empty testimonials after DB failure: {}", e);
            TestimonialGroups::default()
        }
    };

    HttpResponse::Ok().json(groups)
}

/// Configuration for testimonial routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/testimonials", web::get().to(get_testimonials));
}
