// src/models/pricing.rs
// DOCUMENTATION: Pricing package data structures
// PURPOSE: Append-only pricing records for the session packages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Persisted pricing row. Immutable once written; superseded by later
/// inserts rather than updated. "Latest" is max inserted_at.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PricingPackageRecord {
    pub id: Uuid,
    pub inserted_at: DateTime<Utc>,
    pub express_price: Option<f64>,
    pub experience_price: Option<f64>,
    pub deluxe_price: Option<f64>,
}

/// Payload for a superseding pricing insert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingPackageInsert {
    pub express_price: Option<f64>,
    pub experience_price: Option<f64>,
    pub deluxe_price: Option<f64>,
}
