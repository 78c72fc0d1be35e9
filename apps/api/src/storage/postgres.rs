use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::ResumeRepository;
use crate::models::records::{
    ApplicationStatus, MasterResumeRow, NewMasterResume, NewTailoredResume, TailoredResumeRow,
};

/// PostgreSQL-backed résumé records.
pub struct PgResumeRepository {
    pool: PgPool,
}

impl PgResumeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeRepository for PgResumeRepository {
    async fn insert_master(&self, new: NewMasterResume<'_>) -> Result<MasterResumeRow> {
        let row = sqlx::query_as::<_, MasterResumeRow>(
            r#"
            INSERT INTO master_resumes (id, user_id, original_file_name, file_size, blob_key)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(new.original_file_name)
        .bind(new.file_size)
        .bind(new.blob_key)
        .fetch_one(&self.pool)
        .await?;

        info!("Inserted master resume {} for user {}", row.id, row.user_id);
        Ok(row)
    }

    async fn get_master(&self, id: Uuid) -> Result<Option<MasterResumeRow>> {
        Ok(
            sqlx::query_as::<_, MasterResumeRow>("SELECT * FROM master_resumes WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn record_parse(&self, id: Uuid, content: &Value) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE master_resumes
            SET content = $2, parsed_at = NOW(), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(content)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_tailored(
        &self,
        new: NewTailoredResume<'_>,
        section_set: Option<&[String]>,
    ) -> Result<TailoredResumeRow> {
        let mut tx = self.pool.begin().await?;

        if let Some(sections) = section_set {
            sqlx::query(
                "UPDATE master_resumes SET section_set = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(new.master_resume_id)
            .bind(sections)
            .execute(&mut *tx)
            .await?;
        }

        let row = sqlx::query_as::<_, TailoredResumeRow>(
            r#"
            INSERT INTO tailored_resumes
                (id, user_id, master_resume_id, job_title, company, job_description,
                 tailored_content, section_order, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(new.master_resume_id)
        .bind(new.job_title)
        .bind(new.company)
        .bind(new.job_description)
        .bind(new.tailored_content)
        .bind(new.section_order)
        .bind(ApplicationStatus::Draft.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "Inserted tailored resume {} from master {}",
            row.id, row.master_resume_id
        );
        Ok(row)
    }

    async fn get_tailored(&self, id: Uuid) -> Result<Option<TailoredResumeRow>> {
        Ok(
            sqlx::query_as::<_, TailoredResumeRow>("SELECT * FROM tailored_resumes WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_tailored(&self, user_id: &str) -> Result<Vec<TailoredResumeRow>> {
        Ok(sqlx::query_as::<_, TailoredResumeRow>(
            "SELECT * FROM tailored_resumes WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<TailoredResumeRow>> {
        Ok(sqlx::query_as::<_, TailoredResumeRow>(
            "UPDATE tailored_resumes SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?)
    }
}
