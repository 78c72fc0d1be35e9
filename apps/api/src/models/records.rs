use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::resume::ResumeContent;
use crate::models::section::Section;

/// Where the user is with an application. Descriptive only; any transition is allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Draft,
    Applied,
    Interview,
    Rejected,
    Accepted,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "draft",
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Accepted => "accepted",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(ApplicationStatus::Draft),
            "applied" => Ok(ApplicationStatus::Applied),
            "interview" => Ok(ApplicationStatus::Interview),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "accepted" => Ok(ApplicationStatus::Accepted),
            other => Err(format!("unknown application status '{other}'")),
        }
    }
}

/// An uploaded source résumé.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MasterResumeRow {
    pub id: Uuid,
    pub user_id: String,
    pub original_file_name: String,
    pub file_size: i64,
    pub blob_key: String,
    /// Heuristically parsed content, once `/parse` has run.
    pub content: Option<Value>,
    /// Discovered section tokens, stored after the first successful tailoring run.
    pub section_set: Option<Vec<String>>,
    pub parsed_at: Option<DateTime<Utc>>,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A job-specific rewrite of a master résumé.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TailoredResumeRow {
    pub id: Uuid,
    pub user_id: String,
    pub master_resume_id: Uuid,
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub job_description: String,
    pub tailored_content: Value,
    pub section_order: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// API view of a tailored résumé: typed content, section order and status.
#[derive(Debug, Clone, Serialize)]
pub struct TailoredResume {
    pub id: Uuid,
    pub master_resume_id: Uuid,
    pub user_id: String,
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub job_description: String,
    pub content: ResumeContent,
    pub section_order: Vec<Section>,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TailoredResumeRow> for TailoredResume {
    type Error = anyhow::Error;

    fn try_from(row: TailoredResumeRow) -> Result<Self, Self::Error> {
        let content: ResumeContent = serde_json::from_value(row.tailored_content)?;
        let section_order = row
            .section_order
            .iter()
            .map(|token| token.parse::<Section>())
            .collect::<Result<Vec<_>, _>>()?;
        let status = row
            .status
            .parse::<ApplicationStatus>()
            .map_err(anyhow::Error::msg)?;

        Ok(TailoredResume {
            id: row.id,
            master_resume_id: row.master_resume_id,
            user_id: row.user_id,
            job_title: row.job_title,
            company: row.company,
            job_description: row.job_description,
            content,
            section_order,
            status,
            created_at: row.created_at,
        })
    }
}

pub struct NewMasterResume<'a> {
    pub user_id: &'a str,
    pub original_file_name: &'a str,
    pub file_size: i64,
    pub blob_key: &'a str,
}

pub struct NewTailoredResume<'a> {
    pub user_id: &'a str,
    pub master_resume_id: Uuid,
    pub job_title: Option<&'a str>,
    pub company: Option<&'a str>,
    pub job_description: &'a str,
    pub tailored_content: &'a Value,
    pub section_order: &'a [String],
}
