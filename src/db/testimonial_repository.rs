// src/db/testimonial_repository.rs
// DOCUMENTATION: Testimonial database operations
// PURPOSE: Read published client testimonials

use crate::errors::GalleryError;
use crate::models::Testimonial;
use sqlx::PgPool;

const STATUS_PUBLISHED: i32 = 2;

pub struct TestimonialRepository;

impl TestimonialRepository {
    /// Get published testimonials, newest first
    /// DOCUMENTATION: Only rows moderated into the published state are exposed
    pub async fn get_published(pool: &PgPool) -> Result<Vec<Testimonial>, GalleryError> {
        let testimonials = sqlx::query_as::<_, Testimonial>(
            r#"
            SELECT id, name, location, rating, content, featured, image,
                   created_at AS date
            FROM testimonials
            WHERE status_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(STATUS_PUBLISHED)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch testimonials: {}", e);
            GalleryError::DatabaseError(format!("Fetch testimonials failed: {}", e))
        })?;

        Ok(testimonials)
    }
}
