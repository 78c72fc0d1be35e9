//! Human-readable summary of what tailoring changed relative to the parsed master.

use serde::Serialize;

use crate::models::resume::ResumeContent;
use crate::models::section::Section;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Modified,
    Reordered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResumeChange {
    pub section: Section,
    pub kind: ChangeKind,
    pub description: String,
}

pub fn summarize_changes(original: &ResumeContent, tailored: &ResumeContent) -> Vec<ResumeChange> {
    let mut changes = Vec::new();

    if original.professional_summary != tailored.professional_summary {
        changes.push(ResumeChange {
            section: Section::ProfessionalSummary,
            kind: ChangeKind::Modified,
            description: "Professional summary optimized for job requirements".to_string(),
        });
    }

    if let (Some(before), Some(after)) = (&original.skills, &tailored.skills) {
        if before != after {
            let same_items = {
                let mut a: Vec<&String> = before.all().collect();
                let mut b: Vec<&String> = after.all().collect();
                a.sort();
                b.sort();
                a == b
            };
            let (kind, description) = if same_items {
                (
                    ChangeKind::Reordered,
                    "Skills reordered to prioritize job-relevant technologies",
                )
            } else {
                (
                    ChangeKind::Modified,
                    "Skills regrouped and updated for job relevance",
                )
            };
            changes.push(ResumeChange {
                section: Section::Skills,
                kind,
                description: description.to_string(),
            });
        }
    }

    let experience = original.experience.iter().flatten();
    let tailored_experience = tailored.experience.iter().flatten();
    for (i, (before, after)) in experience.zip(tailored_experience).enumerate() {
        if before.description != after.description {
            changes.push(ResumeChange {
                section: Section::Experience,
                kind: ChangeKind::Modified,
                description: format!(
                    "Experience entry {} enhanced with relevant keywords and achievements",
                    i + 1
                ),
            });
        }
    }

    let projects = original.projects.iter().flatten();
    let tailored_projects = tailored.projects.iter().flatten();
    for (i, (before, after)) in projects.zip(tailored_projects).enumerate() {
        if before.description != after.description || before.achievements != after.achievements {
            changes.push(ResumeChange {
                section: Section::Projects,
                kind: ChangeKind::Modified,
                description: format!(
                    "Project {} description and achievements optimized for job relevance",
                    i + 1
                ),
            });
        }
    }

    changes
}
