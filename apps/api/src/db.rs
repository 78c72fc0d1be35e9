use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the résumé tables and indexes if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS master_resumes (
            id                 UUID PRIMARY KEY,
            user_id            TEXT NOT NULL,
            original_file_name TEXT NOT NULL,
            file_size          BIGINT NOT NULL,
            blob_key           TEXT NOT NULL,
            content            JSONB,
            section_set        TEXT[],
            parsed_at          TIMESTAMPTZ,
            uploaded_at        TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at         TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tailored_resumes (
            id               UUID PRIMARY KEY,
            user_id          TEXT NOT NULL,
            master_resume_id UUID NOT NULL REFERENCES master_resumes(id) ON DELETE CASCADE,
            job_title        TEXT,
            company          TEXT,
            job_description  TEXT NOT NULL,
            tailored_content JSONB NOT NULL,
            section_order    TEXT[] NOT NULL,
            status           TEXT NOT NULL DEFAULT 'draft',
            created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_master_resumes_user ON master_resumes(user_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_tailored_resumes_user ON tailored_resumes(user_id, created_at DESC)",
    )
    .execute(pool)
    .await?;

    info!("Database schema ready");
    Ok(())
}
