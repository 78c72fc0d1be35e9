//! Content Tailoring: asks the model for a job-specific rewrite of the résumé.
//!
//! The output is NOT trusted: it is an unvalidated JSON object that must pass
//! `fidelity::validate_fidelity` before anyone sees it.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::llm_client::prompts::NO_FABRICATION_INSTRUCTION;
use crate::llm_client::{extract_json_object, DocumentModel};
use crate::tailoring::prompts::{TAILORING_PROMPT_TEMPLATE, TAILORING_SYSTEM};
use crate::tailoring::TailorError;

/// Attempts made when the model answers with something unusable.
pub const MAX_TAILORING_ATTEMPTS: u32 = 2;

/// The job a résumé is being tailored for.
#[derive(Debug, Clone, Deserialize)]
pub struct JobContext {
    pub job_description: String,
    pub job_title: Option<String>,
    pub company: Option<String>,
}

/// Produces an unvalidated tailored résumé object.
///
/// Fails with `TailoringGeneration` when, after `MAX_TAILORING_ATTEMPTS`, no
/// answer parsed into a JSON object carrying a non-empty `personalInfo.name`.
pub async fn tailor_content(
    model: &dyn DocumentModel,
    pdf: &[u8],
    job: &JobContext,
) -> Result<Map<String, Value>, TailorError> {
    let prompt = build_tailoring_prompt(job);
    let mut last_problem = String::new();

    for attempt in 1..=MAX_TAILORING_ATTEMPTS {
        let answer = model
            .complete_with_document(TAILORING_SYSTEM, &prompt, pdf)
            .await?;

        match parse_tailoring_answer(&answer) {
            Ok(candidate) => {
                info!(
                    "Tailoring produced sections: {:?}",
                    candidate.keys().collect::<Vec<_>>()
                );
                return Ok(candidate);
            }
            Err(problem) => {
                warn!(
                    "Tailoring attempt {}/{} unusable: {}",
                    attempt, MAX_TAILORING_ATTEMPTS, problem
                );
                last_problem = problem;
            }
        }
    }

    Err(TailorError::TailoringGeneration(last_problem))
}

fn build_tailoring_prompt(job: &JobContext) -> String {
    let mut details = Vec::new();
    if let Some(title) = job.job_title.as_deref().filter(|t| !t.trim().is_empty()) {
        details.push(format!("Position: {}", title.trim()));
    }
    if let Some(company) = job.company.as_deref().filter(|c| !c.trim().is_empty()) {
        details.push(format!("Company: {}", company.trim()));
    }
    let details = if details.is_empty() {
        "(not specified)".to_string()
    } else {
        details.join("\n")
    };

    TAILORING_PROMPT_TEMPLATE
        .replace("{job_details}", &details)
        .replace("{job_description}", job.job_description.trim())
        .replace("{no_fabrication}", NO_FABRICATION_INSTRUCTION)
}

fn parse_tailoring_answer(answer: &str) -> Result<Map<String, Value>, String> {
    let json = extract_json_object(answer)
        .ok_or_else(|| "no JSON object in model response".to_string())?;
    let value: Value =
        serde_json::from_str(json).map_err(|e| format!("JSON parsing failed: {e}"))?;

    let Value::Object(candidate) = value else {
        return Err("model response is not a JSON object".to_string());
    };

    let has_name = candidate
        .get("personalInfo")
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
        .map(|name| !name.trim().is_empty())
        .unwrap_or(false);
    if !has_name {
        return Err("response is missing personalInfo.name".to_string());
    }

    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::scripted::ScriptedModel;

    const PDF: &[u8] = b"%PDF-1.4 fake";

    fn job() -> JobContext {
        JobContext {
            job_description: "Build data pipelines in Rust and Kafka.".to_string(),
            job_title: Some("Data Engineer".to_string()),
            company: Some("  ".to_string()),
        }
    }

    #[test]
    fn test_prompt_carries_job_context() {
        let prompt = build_tailoring_prompt(&job());
        assert!(prompt.contains("Position: Data Engineer"));
        assert!(!prompt.contains("Company:"));
        assert!(prompt.contains("Build data pipelines in Rust and Kafka."));
        assert!(prompt.contains("Do NOT invent"));
        assert!(!prompt.contains("{job_description}"));
    }

    #[test]
    fn test_prompt_without_title_or_company() {
        let prompt = build_tailoring_prompt(&JobContext {
            job_description: "Anything".to_string(),
            job_title: None,
            company: None,
        });
        assert!(prompt.contains("(not specified)"));
    }

    #[tokio::test]
    async fn test_returns_candidate_object_unvalidated() {
        let model = ScriptedModel::texts([
            r#"Here you go: {"personalInfo": {"name": "Ada"}, "links": ["x"]}"#,
        ]);

        let candidate = tailor_content(&model, PDF, &job()).await.unwrap();

        assert!(candidate.contains_key("links"));
        assert_eq!(candidate["personalInfo"]["name"], "Ada");
        assert!(model.prompts()[0].contains("Data Engineer"));
    }

    #[tokio::test]
    async fn test_missing_name_fails_after_retries() {
        let model = ScriptedModel::texts([r#"{"personalInfo": {"name": ""}, "skills": {}}"#]);

        let err = tailor_content(&model, PDF, &job()).await.unwrap_err();

        assert!(matches!(err, TailorError::TailoringGeneration(_)));
        assert_eq!(model.calls() as u32, MAX_TAILORING_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_invalid_json_is_retried() {
        let model = ScriptedModel::texts([
            r#"{"personalInfo": {"name": "Ada",}"#,
            r#"{"personalInfo": {"name": "Ada"}}"#,
        ]);

        let candidate = tailor_content(&model, PDF, &job()).await.unwrap();

        assert_eq!(candidate.len(), 1);
        assert_eq!(model.calls(), 2);
    }
}
