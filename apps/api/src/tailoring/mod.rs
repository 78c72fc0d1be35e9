// Résumé tailoring: structure discovery, content tailoring and the fidelity gate.
// All LLM calls go through llm_client::DocumentModel, never the HTTP API directly.

pub mod changes;
pub mod discovery;
pub mod fidelity;
pub mod handlers;
pub mod keywords;
pub mod pipeline;
pub mod prompts;
pub mod tailor;

use thiserror::Error;

use crate::errors::AppError;
use crate::llm_client::LlmError;

/// Failures of the discovery → tailoring → validation pipeline.
#[derive(Debug, Error)]
pub enum TailorError {
    #[error("Could not extract resume structure: {0}")]
    StructureExtraction(String),

    #[error("Could not generate tailored resume: {0}")]
    TailoringGeneration(String),

    #[error("Invalid resume structure returned by model: {0}")]
    InvalidResumeStructure(String),

    #[error("Model call failed: {0}")]
    Model(#[from] LlmError),
}

impl From<TailorError> for AppError {
    fn from(e: TailorError) -> Self {
        match e {
            TailorError::StructureExtraction(msg) => AppError::StructureExtraction(msg),
            TailorError::TailoringGeneration(msg) => AppError::Tailoring(msg),
            TailorError::InvalidResumeStructure(msg) => AppError::InvalidResumeStructure(msg),
            TailorError::Model(e) => AppError::Llm(e.to_string()),
        }
    }
}
