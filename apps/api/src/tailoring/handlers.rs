//! Axum route handlers for the Tailoring API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::intake::handlers::load_master;
use crate::intake::validation::validate_user_id;
use crate::models::records::{
    ApplicationStatus, MasterResumeRow, NewTailoredResume, TailoredResume, TailoredResumeRow,
};
use crate::models::resume::ResumeContent;
use crate::models::section::SectionSet;
use crate::state::AppState;
use crate::tailoring::changes::{summarize_changes, ResumeChange};
use crate::tailoring::fidelity::FidelityReport;
use crate::tailoring::keywords::{extract_job_keywords, keyword_coverage, KeywordCoverage};
use crate::tailoring::pipeline::run_tailoring;
use crate::tailoring::tailor::JobContext;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TailorRequest {
    #[serde(flatten)]
    pub job: JobContext,
    /// When given, must match the owner of the master résumé.
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TailorResponse {
    pub tailored: TailoredResume,
    pub sections_discovered_now: bool,
    pub fidelity: FidelityReport,
    /// Present when the master résumé has been parsed.
    pub changes: Option<Vec<ResumeChange>>,
    pub keyword_coverage: KeywordCoverage,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub user_id: String,
    pub tailored_resumes: Vec<TailoredResume>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/:id/tailor
///
/// Discovery (skipped when the master already carries a section set) →
/// tailoring → fidelity gate. Only a validated result is persisted; a newly
/// discovered section set is stored in the same write.
pub async fn handle_tailor(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Json(request): Json<TailorRequest>,
) -> Result<Json<TailorResponse>, AppError> {
    let job = request.job;
    if job.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }

    let master = load_master(&state, resume_id).await?;
    if let Some(user_id) = request.user_id.as_deref() {
        if user_id != master.user_id {
            return Err(AppError::Forbidden(format!(
                "Resume {resume_id} does not belong to {user_id}"
            )));
        }
    }

    let pdf = state
        .blobs
        .get(&master.blob_key)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    let known_sections = master.section_set.as_ref().map(SectionSet::from_tokens);
    let outcome = run_tailoring(state.model.as_ref(), &pdf, known_sections, &job).await?;

    let tailored_content =
        serde_json::to_value(&outcome.report.content).map_err(|e| AppError::Internal(e.into()))?;
    let section_order: Vec<String> = outcome
        .report
        .section_order
        .iter()
        .map(|s| s.key().to_string())
        .collect();
    let new_section_set = outcome.discovered_now.then(|| outcome.sections.keys());

    let row = state
        .repo
        .insert_tailored(
            NewTailoredResume {
                user_id: &master.user_id,
                master_resume_id: master.id,
                job_title: job.job_title.as_deref(),
                company: job.company.as_deref(),
                job_description: &job.job_description,
                tailored_content: &tailored_content,
                section_order: &section_order,
            },
            new_section_set.as_deref(),
        )
        .await
        .map_err(AppError::Database)?;

    info!(
        "Stored tailored resume {} for master {resume_id} ({} sections)",
        row.id,
        section_order.len()
    );

    let changes = parsed_master_content(&master)
        .map(|original| summarize_changes(&original, &outcome.report.content));
    let keywords = extract_job_keywords(&job.job_description);
    let coverage = keyword_coverage(&outcome.report.content, &keywords);

    Ok(Json(TailorResponse {
        tailored: to_view(row)?,
        sections_discovered_now: outcome.discovered_now,
        fidelity: outcome.report,
        changes,
        keyword_coverage: coverage,
    }))
}

/// GET /api/v1/tailored?user_id=
pub async fn handle_list_tailored(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, AppError> {
    validate_user_id(&query.user_id)?;

    let rows = state
        .repo
        .list_tailored(&query.user_id)
        .await
        .map_err(AppError::Database)?;
    let tailored_resumes = rows.into_iter().map(to_view).collect::<Result<Vec<_>, _>>()?;

    Ok(Json(ListResponse {
        user_id: query.user_id,
        tailored_resumes,
    }))
}

/// GET /api/v1/tailored/:id
pub async fn handle_get_tailored(
    State(state): State<AppState>,
    Path(tailored_id): Path<Uuid>,
) -> Result<Json<TailoredResume>, AppError> {
    let row = state
        .repo
        .get_tailored(tailored_id)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound(format!("Tailored resume {tailored_id} not found")))?;

    Ok(Json(to_view(row)?))
}

/// PATCH /api/v1/tailored/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path(tailored_id): Path<Uuid>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<TailoredResume>, AppError> {
    let status: ApplicationStatus = request.status.parse().map_err(AppError::Validation)?;

    let row = state
        .repo
        .update_status(tailored_id, status)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound(format!("Tailored resume {tailored_id} not found")))?;

    info!("Tailored resume {tailored_id} is now {status}");
    Ok(Json(to_view(row)?))
}

fn to_view(row: TailoredResumeRow) -> Result<TailoredResume, AppError> {
    TailoredResume::try_from(row).map_err(AppError::Internal)
}

/// The heuristic parse stored on the master, if any and if readable.
fn parsed_master_content(master: &MasterResumeRow) -> Option<ResumeContent> {
    let value = master.content.clone()?;
    match serde_json::from_value(value) {
        Ok(content) => Some(content),
        Err(e) => {
            warn!("Ignoring unreadable parsed content on master {}: {e}", master.id);
            None
        }
    }
}
