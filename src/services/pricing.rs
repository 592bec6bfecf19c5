// src/services/pricing.rs
// DOCUMENTATION: CPI-indexed pricing recalculation
// PURPOSE: Derive a superseding pricing record from the latest CPI figure

use crate::db::PricingRepository;
use crate::errors::GalleryError;
use crate::models::{PricingPackageInsert, PricingPackageRecord};
use crate::services::mailer::Mailer;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;

const INE_IPC_URL: &str =
    "https://servicios.ine.es/wstempus/js/ES/DATOS_SERIE/IPC251856?nult=1";

#[derive(Debug, Deserialize)]
struct IneSeries {
    #[serde(rename = "Data")]
    data: Vec<IneDataPoint>,
}

#[derive(Debug, Deserialize)]
struct IneDataPoint {
    #[serde(rename = "Valor")]
    valor: Option<f64>,
}

/// Fetches the latest annual CPI variation from the INE open-data API
pub struct CpiClient {
    client: reqwest::Client,
    url: String,
}

impl CpiClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            url: INE_IPC_URL.to_string(),
        }
    }

    pub async fn fetch_latest_ipc(&self) -> Result<f64, GalleryError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| GalleryError::ExternalApiError(format!("INE request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(GalleryError::ExternalApiError(format!(
                "INE returned status {}",
                response.status()
            )));
        }

        let series: Vec<IneSeries> = response
            .json()
            .await
            .map_err(|e| GalleryError::ExternalApiError(format!("Invalid INE payload: {}", e)))?;

        series
            .first()
            .and_then(|s| s.data.first())
            .and_then(|d| d.valor)
            .ok_or_else(|| {
                GalleryError::ExternalApiError("INE payload carried no CPI value".to_string())
            })
    }
}

impl Default for CpiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Scale a price by the adjustment factor, rounded to cents
pub fn adjust_price(price: Option<f64>, factor: f64) -> Option<f64> {
    price.map(|p| (p * factor * 100.0).round() / 100.0)
}

/// Result of a recalculation run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculationOutcome {
    pub record: PricingPackageRecord,
    pub ipc_percentage: f64,
    pub adjustment_factor: f64,
}

pub struct PricingService;

impl PricingService {
    /// Recalculate package prices from the latest CPI figure and insert a
    /// superseding record. Fails when no baseline record exists.
    pub async fn recalculate(
        pool: &PgPool,
        cpi: &CpiClient,
        mailer: &Arc<dyn Mailer>,
        recipient: &str,
    ) -> Result<RecalculationOutcome, GalleryError> {
        let latest = PricingRepository::latest(pool)
            .await?
            .ok_or_else(|| GalleryError::NotFound("no pricing record to adjust".to_string()))?;

        let ipc = cpi.fetch_latest_ipc().await?;
        let factor = 1.0 + ipc / 100.0;

        let insert = PricingPackageInsert {
            express_price: adjust_price(latest.express_price, factor),
            experience_price: adjust_price(latest.experience_price, factor),
            deluxe_price: adjust_price(latest.deluxe_price, factor),
        };

        let record = PricingRepository::insert(pool, &insert).await?;
        log::info!(
            "Recalculated pricing with CPI {:.2}% (factor {:.4})",
            ipc,
            factor
        );

        let body = format!(
            "Pricing recalculated with CPI {:.2}% (factor {:.4}).\n\n\
             Express: {:?}\nExperience: {:?}\nDeluxe: {:?}",
            ipc, factor, record.express_price, record.experience_price, record.deluxe_price
        );
        mailer
            .send_email(recipient, "Pricing recalculation", &body)
            .await;

        Ok(RecalculationOutcome {
            record,
            ipc_percentage: ipc,
            adjustment_factor: factor,
        })
    }
}
