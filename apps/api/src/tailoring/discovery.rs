//! Structure Discovery: asks the model which vocabulary sections a document has.

use serde::Deserialize;
use tracing::{info, warn};

use crate::llm_client::{extract_json_object, DocumentModel};
use crate::models::section::SectionSet;
use crate::tailoring::prompts::{DISCOVERY_PROMPT, DISCOVERY_SYSTEM};
use crate::tailoring::TailorError;

/// Attempts made when the model answers with something unparseable.
pub const MAX_DISCOVERY_ATTEMPTS: u32 = 2;

#[derive(Debug, Deserialize)]
struct DiscoveryAnswer {
    sections: Vec<String>,
}

/// Determines the `SectionSet` of a PDF résumé.
///
/// Model errors propagate immediately (the client already retried transport
/// failures). Unusable answers are retried up to `MAX_DISCOVERY_ATTEMPTS`.
pub async fn discover_sections(
    model: &dyn DocumentModel,
    pdf: &[u8],
) -> Result<SectionSet, TailorError> {
    let mut last_problem = String::new();

    for attempt in 1..=MAX_DISCOVERY_ATTEMPTS {
        let answer = model
            .complete_with_document(DISCOVERY_SYSTEM, DISCOVERY_PROMPT, pdf)
            .await?;

        match parse_discovery_answer(&answer) {
            Ok(sections) => {
                info!("Discovered resume sections: {:?}", sections.keys());
                return Ok(sections);
            }
            Err(problem) => {
                warn!(
                    "Discovery attempt {}/{} unusable: {}",
                    attempt, MAX_DISCOVERY_ATTEMPTS, problem
                );
                last_problem = problem;
            }
        }
    }

    Err(TailorError::StructureExtraction(last_problem))
}

fn parse_discovery_answer(answer: &str) -> Result<SectionSet, String> {
    let json = extract_json_object(answer)
        .ok_or_else(|| "no JSON object in model response".to_string())?;
    let parsed: DiscoveryAnswer =
        serde_json::from_str(json).map_err(|e| format!("malformed sections object: {e}"))?;

    let sections = SectionSet::from_tokens(&parsed.sections);
    if sections.is_empty() {
        return Err("model reported no recognised sections".to_string());
    }
    Ok(sections)
}
