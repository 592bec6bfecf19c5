// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for entire application

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: Comprehensive error enum for all possible failures
/// Each variant maps to appropriate HTTP status code and error response
#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Object storage error: {0}")]
    StorageError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Forbidden access")]
    Forbidden,

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Image processing error: {0}")]
    ImageError(String),

    #[error("Email delivery error: {0}")]
    EmailError(String),

    #[error("Service temporarily unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Convert GalleryError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON responses
impl ResponseError for GalleryError {
    fn error_response(&self) -> HttpResponse {
        let (status, error_code) = match self {
            GalleryError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            GalleryError::DatabaseError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            GalleryError::StorageError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            GalleryError::CacheError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CACHE_ERROR"),
            GalleryError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            GalleryError::ValidationError(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            GalleryError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            GalleryError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            GalleryError::ExternalApiError(_) => (StatusCode::BAD_GATEWAY, "EXTERNAL_API_ERROR"),
            GalleryError::ImageError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IMAGE_ERROR"),
            GalleryError::EmailError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "EMAIL_ERROR"),
            GalleryError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
        };

        let body = json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        HttpResponse::build(status).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            GalleryError::NotFound(_) => StatusCode::NOT_FOUND,
            GalleryError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GalleryError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GalleryError::CacheError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GalleryError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            GalleryError::ValidationError(_) => StatusCode::BAD_REQUEST,
            GalleryError::Unauthorized => StatusCode::UNAUTHORIZED,
            GalleryError::Forbidden => StatusCode::FORBIDDEN,
            GalleryError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
            GalleryError::ImageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GalleryError::EmailError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GalleryError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}
