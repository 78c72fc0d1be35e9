//! Axum route handlers for master résumé intake.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::intake::extract::{extract_text, parse_resume_text};
use crate::intake::validation::{
    resume_file_name, validate_pdf_upload, validate_user_id, PDF_CONTENT_TYPE,
};
use crate::models::records::{MasterResumeRow, NewMasterResume};
use crate::models::resume::ResumeContent;
use crate::state::AppState;
use crate::storage::upload_key;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub resume_id: Uuid,
    pub user_id: String,
    pub file_name: String,
    pub file_size: i64,
}

#[derive(Debug, Serialize)]
pub struct ParseResponse {
    pub resume_id: Uuid,
    pub content: ResumeContent,
}

struct UploadedFile {
    original_name: String,
    content_type: Option<String>,
    bytes: Bytes,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/upload
///
/// Multipart form: `resume` (PDF file) and optional `user_id`. Stores the file
/// under `resumes/<user>/` and creates the master record.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut file: Option<UploadedFile> = None;
    let mut user_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("resume") => {
                let original_name = field.file_name().unwrap_or("resume.pdf").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read file: {e}")))?;
                file = Some(UploadedFile {
                    original_name,
                    content_type,
                    bytes,
                });
            }
            Some("user_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read user_id: {e}")))?;
                let text = text.trim();
                if !text.is_empty() {
                    user_id = Some(text.to_string());
                }
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;
    validate_pdf_upload(
        file.content_type.as_deref(),
        &file.bytes,
        state.config.max_upload_bytes,
    )?;

    let now_millis = chrono::Utc::now().timestamp_millis();
    let user_id = user_id.unwrap_or_else(|| format!("user_{now_millis}"));
    validate_user_id(&user_id)?;

    let file_name = resume_file_name(&file.original_name, &user_id, now_millis);
    let key = upload_key(&user_id, &file_name);
    let file_size = file.bytes.len() as i64;

    state
        .blobs
        .put(&key, file.bytes, PDF_CONTENT_TYPE)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    let master = state
        .repo
        .insert_master(NewMasterResume {
            user_id: &user_id,
            original_file_name: &file.original_name,
            file_size,
            blob_key: &key,
        })
        .await
        .map_err(AppError::Database)?;

    info!("Uploaded master resume {} for {user_id} ({file_size} bytes)", master.id);

    Ok(Json(UploadResponse {
        resume_id: master.id,
        user_id,
        file_name,
        file_size,
    }))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<MasterResumeRow>, AppError> {
    let master = load_master(&state, resume_id).await?;
    Ok(Json(master))
}

/// POST /api/v1/resumes/:id/parse
///
/// Heuristic text parse of the stored PDF, with no model call. The result is
/// stored on the master record and later used as the "before" side of the
/// tailoring change summary.
pub async fn handle_parse(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<ParseResponse>, AppError> {
    let master = load_master(&state, resume_id).await?;

    let pdf = state
        .blobs
        .get(&master.blob_key)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    let content = tokio::task::spawn_blocking(move || {
        extract_text(&pdf).map(|text| parse_resume_text(&text))
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))?
    .map_err(|e| AppError::Validation(e.to_string()))?;

    let value = serde_json::to_value(&content).map_err(|e| AppError::Internal(e.into()))?;
    state
        .repo
        .record_parse(resume_id, &value)
        .await
        .map_err(AppError::Database)?;

    info!(
        "Parsed master resume {resume_id}: sections {:?}",
        content.present_sections()
    );

    Ok(Json(ParseResponse { resume_id, content }))
}

pub(crate) async fn load_master(
    state: &AppState,
    resume_id: Uuid,
) -> Result<MasterResumeRow, AppError> {
    state
        .repo
        .get_master(resume_id)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))
}
