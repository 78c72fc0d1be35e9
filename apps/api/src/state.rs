use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::DocumentModel;
use crate::render::PdfRenderer;
use crate::storage::{BlobStore, ResumeRepository};

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Every external collaborator is a trait object built once in `main`, so tests
/// can swap in in-memory stores and a scripted model.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn ResumeRepository>,
    pub blobs: Arc<dyn BlobStore>,
    pub model: Arc<dyn DocumentModel>,
    /// Default: lopdf `Typesetter`.
    pub renderer: Arc<dyn PdfRenderer>,
    pub config: Config,
}
