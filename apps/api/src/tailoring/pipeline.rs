//! Tailoring pipeline: discovery → tailoring → fidelity validation.
//!
//! Persists nothing. Callers store the outcome only when this returns `Ok`.

use tracing::{info, warn};

use crate::llm_client::DocumentModel;
use crate::models::section::SectionSet;
use crate::tailoring::discovery::discover_sections;
use crate::tailoring::fidelity::{validate_fidelity, FidelityReport};
use crate::tailoring::tailor::{tailor_content, JobContext};
use crate::tailoring::TailorError;

#[derive(Debug)]
pub struct TailoringOutcome {
    /// The section set the output was validated against.
    pub sections: SectionSet,
    /// True when `sections` came from a discovery call made during this run.
    pub discovered_now: bool,
    pub report: FidelityReport,
}

/// Runs the full pipeline for one PDF.
///
/// `known_sections` is the set stored on the master record from an earlier
/// run; when present (and non-empty) discovery is skipped.
pub async fn run_tailoring(
    model: &dyn DocumentModel,
    pdf: &[u8],
    known_sections: Option<SectionSet>,
    job: &JobContext,
) -> Result<TailoringOutcome, TailorError> {
    // Step 1: Structure discovery (once per document)
    let (sections, discovered_now) = match known_sections.filter(|s| !s.is_empty()) {
        Some(sections) => {
            info!("Reusing stored section set: {:?}", sections.keys());
            (sections, false)
        }
        None => (discover_sections(model, pdf).await?, true),
    };

    // Step 2: Content tailoring
    let candidate = tailor_content(model, pdf, job).await?;

    // Step 3: Fidelity gate
    let report = validate_fidelity(candidate, &sections)?;
    if report.is_exact() {
        info!(
            "Tailoring validated: all {} sections kept",
            report.section_order.len()
        );
    } else {
        warn!(
            "Tailoring validated with gaps: missing {:?}, dropped {:?}",
            report.missing, report.dropped
        );
    }

    Ok(TailoringOutcome {
        sections,
        discovered_now,
        report,
    })
}
