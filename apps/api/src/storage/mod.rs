//! Storage seams: blob storage for PDFs and the résumé record repository.
//!
//! Production implementations (`S3BlobStore`, `PgResumeRepository`) are built
//! once in `main` and carried in `AppState` as trait objects.

#[cfg(test)]
pub mod memory;
pub mod postgres;
pub mod s3;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use uuid::Uuid;

use crate::models::records::{
    ApplicationStatus, MasterResumeRow, NewMasterResume, NewTailoredResume, TailoredResumeRow,
};

/// Object storage for uploaded and generated PDFs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// A time-limited URL the client can download `key` from.
    async fn download_url(&self, key: &str) -> Result<String>;
}

/// Persistence for master and tailored résumé records.
#[async_trait]
pub trait ResumeRepository: Send + Sync {
    async fn insert_master(&self, new: NewMasterResume<'_>) -> Result<MasterResumeRow>;

    async fn get_master(&self, id: Uuid) -> Result<Option<MasterResumeRow>>;

    /// Stores heuristically parsed content and stamps `parsed_at`.
    async fn record_parse(&self, id: Uuid, content: &Value) -> Result<()>;

    /// Inserts a tailored résumé. When `section_set` is given it is stored on
    /// the master record in the same transaction.
    async fn insert_tailored(
        &self,
        new: NewTailoredResume<'_>,
        section_set: Option<&[String]>,
    ) -> Result<TailoredResumeRow>;

    async fn get_tailored(&self, id: Uuid) -> Result<Option<TailoredResumeRow>>;

    /// Tailored résumés of a user, newest first.
    async fn list_tailored(&self, user_id: &str) -> Result<Vec<TailoredResumeRow>>;

    async fn update_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<TailoredResumeRow>>;
}

/// Blob key for an uploaded master résumé.
pub fn upload_key(user_id: &str, file_name: &str) -> String {
    format!("resumes/{user_id}/{file_name}")
}

/// Blob key for an exported résumé PDF.
pub fn export_key(user_id: &str, file_name: &str) -> String {
    format!("tailored-pdfs/{user_id}/{file_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(
            upload_key("user_1", "cv_user_1_5.pdf"),
            "resumes/user_1/cv_user_1_5.pdf"
        );
        assert_eq!(
            export_key("user_1", "cv_user_1_5.pdf"),
            "tailored-pdfs/user_1/cv_user_1_5.pdf"
        );
    }
}
