use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Upstream failures (model, blob storage) surface their text to the caller with
/// a 502; local failures (database, renderer, internal) are logged and answered
/// with a generic 500.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Structure extraction failed: {0}")]
    StructureExtraction(String),

    #[error("Tailoring failed: {0}")]
    Tailoring(String),

    #[error("Invalid resume structure: {0}")]
    InvalidResumeStructure(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Database error: {0}")]
    Database(anyhow::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn status_code_and_message(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (StatusCode::BAD_GATEWAY, "LLM_ERROR", msg.clone())
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (StatusCode::BAD_GATEWAY, "STORAGE_ERROR", msg.clone())
            }
            AppError::StructureExtraction(msg) => {
                tracing::error!("Structure extraction failed: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "STRUCTURE_EXTRACTION_FAILED",
                    msg.clone(),
                )
            }
            AppError::Tailoring(msg) => {
                tracing::error!("Tailoring failed: {msg}");
                (StatusCode::BAD_GATEWAY, "TAILORING_FAILED", msg.clone())
            }
            AppError::InvalidResumeStructure(msg) => {
                tracing::error!("Invalid resume structure: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "INVALID_RESUME_STRUCTURE",
                    msg.clone(),
                )
            }
            AppError::Render(msg) => {
                tracing::error!("Render error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    "The PDF could not be rendered".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.status_code_and_message();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
