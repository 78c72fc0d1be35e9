//! PDF rendering of structured résumé content.
//!
//! One capability behind a trait so handlers and tests depend on the seam,
//! not on lopdf. `Typesetter` is the only production implementation.

pub mod handlers;
pub mod metrics;
pub mod typeset;

use thiserror::Error;

use crate::models::resume::ResumeContent;

pub use typeset::Typesetter;

const PDF_MAGIC: &[u8] = b"%PDF";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF assembly failed: {0}")]
    Assembly(String),

    #[error("renderer output does not start with a PDF header")]
    InvalidOutput,
}

/// Turns résumé content into a complete PDF document.
///
/// CPU-bound; callers on the async runtime should use `spawn_blocking`.
pub trait PdfRenderer: Send + Sync {
    fn render(&self, content: &ResumeContent) -> Result<Vec<u8>, RenderError>;
}

/// Rejects renderer output that is not a PDF.
pub fn ensure_pdf(bytes: Vec<u8>) -> Result<Vec<u8>, RenderError> {
    if bytes.starts_with(PDF_MAGIC) {
        Ok(bytes)
    } else {
        Err(RenderError::InvalidOutput)
    }
}
