//! Fidelity Validator: the hard gate between model output and the caller.
//!
//! Guarantees `keys(output) ⊆ SectionSet`, orders output sections by the set's
//! discovery order, and requires a non-empty `personalInfo.name`. Sections the
//! model dropped are reported as `missing`; sections it invented are removed
//! and reported as `dropped`. Neither aborts the run.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::models::resume::ResumeContent;
use crate::models::section::{Section, SectionSet};
use crate::tailoring::TailorError;

/// Result of validating one tailoring candidate.
#[derive(Debug, Clone, Serialize)]
pub struct FidelityReport {
    /// The validated content. Serialized separately by callers.
    #[serde(skip)]
    pub content: ResumeContent,
    /// Sections of `content`, in `SectionSet` order.
    pub section_order: Vec<Section>,
    /// Sections in the set that the candidate did not carry.
    pub missing: Vec<Section>,
    /// Candidate keys outside the set, removed.
    pub dropped: Vec<String>,
}

impl FidelityReport {
    /// True when the candidate carried exactly the discovered sections.
    pub fn is_exact(&self) -> bool {
        self.missing.is_empty() && self.dropped.is_empty()
    }
}

pub fn validate_fidelity(
    mut candidate: Map<String, Value>,
    sections: &SectionSet,
) -> Result<FidelityReport, TailorError> {
    let mut kept = Map::new();
    for section in sections.iter() {
        if let Some(value) = candidate.remove(section.key()) {
            if !is_blank(&value) {
                kept.insert(section.key().to_string(), value);
            }
        }
    }

    let dropped: Vec<String> = candidate.keys().cloned().collect();
    for key in &dropped {
        debug!("Removing section not present in source document: {key}");
    }

    let content: ResumeContent = serde_json::from_value(Value::Object(kept))
        .map_err(|e| TailorError::InvalidResumeStructure(e.to_string()))?;

    if !content.has_valid_name() {
        return Err(TailorError::InvalidResumeStructure(
            "missing personalInfo or name".to_string(),
        ));
    }

    let (section_order, missing): (Vec<Section>, Vec<Section>) =
        sections.iter().partition(|s| content.has_section(*s));
    for section in &missing {
        warn!("Source section {section} missing from tailored content");
    }

    Ok(FidelityReport {
        content,
        section_order,
        missing,
        dropped,
    })
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
