// src/db/pricing_repository.rs
// DOCUMENTATION: Pricing database operations
// PURPOSE: Append-only pricing records, latest row wins

use crate::errors::GalleryError;
use crate::models::{PricingPackageInsert, PricingPackageRecord};
use sqlx::PgPool;

pub struct PricingRepository;

impl PricingRepository {
    /// Get the current pricing record, if any
    pub async fn latest(pool: &PgPool) -> Result<Option<PricingPackageRecord>, GalleryError> {
        let record = sqlx::query_as::<_, PricingPackageRecord>(
            r#"
            SELECT id, inserted_at, express_price, experience_price, deluxe_price
            FROM pricing_packages
            ORDER BY inserted_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch latest pricing: {}", e);
            GalleryError::DatabaseError(format!("Fetch pricing failed: {}", e))
        })?;

        Ok(record)
    }

    /// Insert a superseding pricing record
    /// DOCUMENTATION: Records are never updated in place; history is kept
    pub async fn insert(
        pool: &PgPool,
        prices: &PricingPackageInsert,
    ) -> Result<PricingPackageRecord, GalleryError> {
        let record = sqlx::query_as::<_, PricingPackageRecord>(
            r#"
            INSERT INTO pricing_packages (express_price, experience_price, deluxe_price)
            VALUES ($1, $2, $3)
            RETURNING id, inserted_at, express_price, experience_price, deluxe_price
            "#,
        )
        .bind(prices.express_price)
        .bind(prices.experience_price)
        .bind(prices.deluxe_price)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to insert pricing record: {}", e);
            GalleryError::DatabaseError(format!("Insert pricing failed: {}", e))
        })?;

        Ok(record)
    }
}
