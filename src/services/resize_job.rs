// src/services/resize_job.rs
// DOCUMENTATION: Batch image re-encoder
// PURPOSE: Re-encode oversized bucket images as bounded lossy WebP

use crate::errors::GalleryError;
use crate::services::mailer::Mailer;
use crate::storage::{ObjectRecord, ObjectStore};
use chrono::Utc;
use image::imageops::FilterType;
use image::ImageFormat;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::LazyLock;
use std::time::Instant;

pub const DEFAULT_MAX_DIMENSION: u32 = 2560;
pub const DEFAULT_WEBP_QUALITY: f32 = 80.0;

static CANDIDATE_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png|gif|tiff|avif)$").unwrap());

/// Outcome of one file in the batch
enum FileOutcome {
    Processed {
        original_bytes: i64,
        new_bytes: i64,
    },
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeError {
    pub file: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeMetrics {
    pub duration_ms: u128,
    pub duration_seconds: f64,
    pub total_bytes_saved: i64,
    pub total_bytes_saved_mb: f64,
    pub average_reduction_percentage: f64,
}

/// JSON summary returned by the cron endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeSummary {
    pub message: String,
    pub processed: usize,
    pub converted_or_resized: usize,
    pub skipped: usize,
    pub errors: usize,
    pub error_list: Vec<ResizeError>,
    pub metrics: ResizeMetrics,
}

/// Walks the whole bucket and re-encodes every raster image that is not
/// already a bounded WebP. Files are handled one at a time; a failure on
/// one file never stops the batch.
pub struct ResizeJob {
    store: Arc<dyn ObjectStore>,
    mailer: Arc<dyn Mailer>,
    notification_email: String,
    max_dimension: u32,
    webp_quality: f32,
}

impl ResizeJob {
    pub fn new(store: Arc<dyn ObjectStore>, mailer: Arc<dyn Mailer>, notification_email: String) -> Self {
        Self {
            store,
            mailer,
            notification_email,
            max_dimension: DEFAULT_MAX_DIMENSION,
            webp_quality: DEFAULT_WEBP_QUALITY,
        }
    }

    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    /// Run the full batch. Only a listing failure is fatal; per-file
    /// errors are collected into the summary.
    pub async fn run(&self) -> Result<ResizeSummary, GalleryError> {
        let started = Instant::now();
        log::info!("Starting image re-encode batch");

        let records = self.store.list_objects("").await?;

        let mut processed = 0usize;
        let mut skipped = 0usize;
        let mut error_list = Vec::new();
        let mut total_original_bytes = 0i64;
        let mut total_new_bytes = 0i64;

        for record in &records {
            match self.handle_file(record).await {
                Ok(FileOutcome::Processed {
                    original_bytes,
                    new_bytes,
                }) => {
                    processed += 1;
                    total_original_bytes += original_bytes;
                    total_new_bytes += new_bytes;
                }
                Ok(FileOutcome::Skipped) => skipped += 1,
                Err(e) => {
                    log::error!("Re-encode failed for {}: {}", record.name, e);
                    error_list.push(ResizeError {
                        file: record.name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let elapsed = started.elapsed();
        let total_bytes_saved = total_original_bytes - total_new_bytes;
        let average_reduction = if total_original_bytes > 0 {
            total_bytes_saved as f64 / total_original_bytes as f64 * 100.0
        } else {
            0.0
        };

        let summary = ResizeSummary {
            message: "Job completed".to_string(),
            processed,
            converted_or_resized: processed,
            skipped,
            errors: error_list.len(),
            error_list,
            metrics: ResizeMetrics {
                duration_ms: elapsed.as_millis(),
                duration_seconds: (elapsed.as_secs_f64() * 100.0).round() / 100.0,
                total_bytes_saved,
                total_bytes_saved_mb: (total_bytes_saved as f64 / (1024.0 * 1024.0) * 100.0)
                    .round()
                    / 100.0,
                average_reduction_percentage: (average_reduction * 100.0).round() / 100.0,
            },
        };

        log::info!(
            "Re-encode batch done: {} processed, {} skipped, {} errors in {:.2}s",
            summary.processed,
            summary.skipped,
            summary.errors,
            summary.metrics.duration_seconds
        );

        if summary.processed > 0 || summary.errors > 0 {
            self.send_summary(&summary).await;
        }

        Ok(summary)
    }

    async fn handle_file(&self, record: &ObjectRecord) -> Result<FileOutcome, GalleryError> {
        if record.name.ends_with('/') || !CANDIDATE_EXTENSION.is_match(&record.name) {
            return Ok(FileOutcome::Skipped);
        }

        // Known-bounded WebP needs no download at all
        if self.bounded_per_metadata(record) {
            log::debug!("Skipping {} per metadata", record.name);
            return Ok(FileOutcome::Skipped);
        }

        let bytes = self.store.download(&record.name).await?;
        let original_size = bytes.len() as i64;

        let format = image::guess_format(&bytes)
            .map_err(|e| GalleryError::ImageError(format!("unrecognized format: {}", e)))?;
        let img = image::load_from_memory(&bytes)
            .map_err(|e| GalleryError::ImageError(format!("decode failed: {}", e)))?;

        let (width, height) = (img.width(), img.height());
        let within_bounds = width <= self.max_dimension && height <= self.max_dimension;

        if within_bounds && format == ImageFormat::WebP {
            return Ok(FileOutcome::Skipped);
        }

        let img = if within_bounds {
            img
        } else {
            img.resize(self.max_dimension, self.max_dimension, FilterType::Lanczos3)
        };

        let rgba = img.to_rgba8();
        let encoded = webp::Encoder::from_rgba(&rgba, img.width(), img.height())
            .encode(self.webp_quality)
            .to_vec();
        let new_size = encoded.len() as i64;

        let new_name = CANDIDATE_EXTENSION.replace(&record.name, ".webp").into_owned();

        let mut metadata: HashMap<String, String> = record
            .metadata
            .iter()
            .filter(|(k, _)| k.as_str() != "name")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        metadata.insert("width".to_string(), img.width().to_string());
        metadata.insert("height".to_string(), img.height().to_string());
        metadata.insert("updated".to_string(), Utc::now().to_rfc3339());

        self.store
            .upload(&new_name, encoded, "image/webp", metadata)
            .await?;

        if new_name != record.name {
            self.store.delete(&record.name).await?;
        }

        log::info!(
            "Re-encoded {} -> {} ({} -> {} bytes)",
            record.name,
            new_name,
            original_size,
            new_size
        );

        Ok(FileOutcome::Processed {
            original_bytes: original_size,
            new_bytes: new_size,
        })
    }

    fn bounded_per_metadata(&self, record: &ObjectRecord) -> bool {
        let dim = |key: &str| {
            record
                .metadata
                .get(key)
                .and_then(|v| v.parse::<u32>().ok())
        };
        let is_webp = record
            .content_type
            .as_deref()
            .map(|ct| ct.eq_ignore_ascii_case("image/webp"))
            .unwrap_or(false)
            || record
                .metadata
                .get("format")
                .map(|f| f.eq_ignore_ascii_case("webp"))
                .unwrap_or(false);

        match (dim("width"), dim("height")) {
            (Some(w), Some(h)) if w > 0 && h > 0 => {
                is_webp && w <= self.max_dimension && h <= self.max_dimension
            }
            _ => false,
        }
    }

    async fn send_summary(&self, summary: &ResizeSummary) {
        let errors = if summary.error_list.is_empty() {
            "None".to_string()
        } else {
            summary
                .error_list
                .iter()
                .map(|e| format!("- {}: {}", e.file, e.error))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let body = format!(
            "Job Summary:\n\
             - Processed: {}\n- Resized/Converted: {}\n- Skipped: {}\n- Errors: {}\n\n\
             Metrics:\n\
             - Duration: {:.2}s\n- Storage Saved: {} bytes ({} MB)\n\
             - Avg Reduction: {}%\n\nError details:\n{}",
            summary.processed,
            summary.converted_or_resized,
            summary.skipped,
            summary.errors,
            summary.metrics.duration_seconds,
            summary.metrics.total_bytes_saved,
            summary.metrics.total_bytes_saved_mb,
            summary.metrics.average_reduction_percentage,
            errors
        );

        self.mailer
            .send_email(
                &self.notification_email,
                "[Cron] Image Resizing Job Completed",
                &body,
            )
            .await;
    }
}
