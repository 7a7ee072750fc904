use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::ExtractionError;
use crate::llm_client::LlmError;
use crate::salary::SalaryError;
use crate::storage::StorageError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(#[from] LlmError),

    #[error("Feature disabled: {0}")]
    FeatureDisabled(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Salary estimation failed: {0}")]
    Salary(#[from] SalaryError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code, also used for per-item batch errors.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Extraction(ExtractionError::UnsupportedFormat(_)) => "UNSUPPORTED_FORMAT",
            AppError::Extraction(_) => "EXTRACTION_FAILED",
            AppError::ModelUnavailable(_) => "MODEL_UNAVAILABLE",
            AppError::FeatureDisabled(_) => "FEATURE_DISABLED",
            AppError::Storage(StorageError::NotFound(_)) => "NOT_FOUND",
            AppError::Storage(StorageError::InvalidKey(_)) => "VALIDATION_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Salary(_) => "VALIDATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) | AppError::Storage(StorageError::NotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Validation(_)
            | AppError::Salary(_)
            | AppError::Storage(StorageError::InvalidKey(_))
            | AppError::Extraction(ExtractionError::UnsupportedFormat(_)) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ModelUnavailable(_) | AppError::FeatureDisabled(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::Validation(format!("Invalid multipart body: {}", e.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::NotFound(msg) | AppError::Validation(msg) | AppError::FeatureDisabled(msg) => {
                msg.clone()
            }
            AppError::Extraction(e) => {
                tracing::warn!("Extraction error: {e}");
                e.to_string()
            }
            AppError::ModelUnavailable(e) => {
                tracing::error!("Model gateway error: {e}");
                format!("The analysis model is unavailable: {e}")
            }
            AppError::Storage(StorageError::Io(e)) => {
                tracing::error!("Storage error: {e}");
                "A storage error occurred".to_string()
            }
            AppError::Storage(e) => e.to_string(),
            AppError::Salary(e) => e.to_string(),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
