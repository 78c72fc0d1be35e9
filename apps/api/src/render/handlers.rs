//! Axum route handler for PDF export.

use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::intake::validation::{export_file_name, validate_user_id, PDF_CONTENT_TYPE};
use crate::models::resume::ResumeContent;
use crate::models::section::Section;
use crate::state::AppState;
use crate::storage::export_key;

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub content: Option<Value>,
    pub user_id: String,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub download_url: String,
    pub file_name: String,
    pub byte_size: usize,
    pub sections: Vec<Section>,
    pub pdf_base64: String,
}

/// POST /api/v1/pdf/export
///
/// Renders résumé content to PDF, stores it under `tailored-pdfs/<user>/` and
/// returns a download URL along with the bytes themselves.
pub async fn handle_export(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<Json<ExportResponse>, AppError> {
    validate_user_id(&request.user_id)?;
    let content = export_content(request.content)?;
    let sections = content.present_sections();

    let renderer = state.renderer.clone();
    let pdf = tokio::task::spawn_blocking(move || renderer.render(&content))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .map_err(|e| AppError::Render(e.to_string()))?;

    let file_name = export_file_name(
        request.job_title.as_deref(),
        request.company.as_deref(),
        chrono::Utc::now().timestamp_millis(),
    );
    let key = export_key(&request.user_id, &file_name);
    let byte_size = pdf.len();
    let pdf_base64 = STANDARD.encode(&pdf);

    state
        .blobs
        .put(&key, Bytes::from(pdf), PDF_CONTENT_TYPE)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;
    let download_url = state
        .blobs
        .download_url(&key)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    info!("Exported {key} ({byte_size} bytes)");

    Ok(Json(ExportResponse {
        download_url,
        file_name,
        byte_size,
        sections,
        pdf_base64,
    }))
}

/// Absent content, or content without a name, falls back to the placeholder
/// résumé. Content that does not deserialize is a client error.
fn export_content(raw: Option<Value>) -> Result<ResumeContent, AppError> {
    let raw = match raw {
        None | Some(Value::Null) => {
            info!("No content supplied for export; using placeholder resume");
            return Ok(ResumeContent::placeholder());
        }
        Some(raw) => raw,
    };

    let content: ResumeContent = serde_json::from_value(raw)
        .map_err(|e| AppError::Validation(format!("content is not a valid resume: {e}")))?;

    if content.has_valid_name() {
        Ok(content)
    } else {
        warn!("Export content has no personalInfo.name; using placeholder resume");
        Ok(ResumeContent::placeholder())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_content_uses_placeholder() {
        assert_eq!(export_content(None).unwrap(), ResumeContent::placeholder());
        assert_eq!(
            export_content(Some(Value::Null)).unwrap(),
            ResumeContent::placeholder()
        );
    }

    #[test]
    fn test_nameless_content_uses_placeholder() {
        let raw = json!({"personalInfo": {"name": "  "}, "skills": ["Rust"]});
        assert_eq!(export_content(Some(raw)).unwrap(), ResumeContent::placeholder());
    }

    #[test]
    fn test_named_content_is_kept() {
        let raw = json!({"personalInfo": {"name": "Ada Lovelace"}, "achievements": ["First program"]});
        let content = export_content(Some(raw)).unwrap();
        assert_eq!(
            content.present_sections(),
            vec![Section::PersonalInfo, Section::Achievements]
        );
    }

    #[test]
    fn test_malformed_content_is_rejected() {
        let err = export_content(Some(json!({"experience": "not a list"}))).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
