use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::resume::ResumeRow;
use crate::models::template::{NewTemplate, ResumeTemplateRow};

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

pub async fn find_template(
    pool: &PgPool,
    template_id: Uuid,
) -> Result<Option<ResumeTemplateRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeTemplateRow>("SELECT * FROM resume_templates WHERE id = $1")
        .bind(template_id)
        .fetch_optional(pool)
        .await
}

pub async fn insert_template(
    pool: &PgPool,
    template: &NewTemplate,
) -> Result<ResumeTemplateRow, sqlx::Error> {
    let row = sqlx::query_as::<_, ResumeTemplateRow>(
        r#"
        INSERT INTO resume_templates
            (id, name, title, description, preview_data, html_template, keywords)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&template.name)
    .bind(&template.title)
    .bind(&template.description)
    .bind(&template.preview_data)
    .bind(&template.html_template)
    .bind(&template.keywords)
    .fetch_one(pool)
    .await?;

    info!("Inserted resume template {} ({})", row.id, row.name);
    Ok(row)
}

pub async fn update_template(
    pool: &PgPool,
    template_id: Uuid,
    template: &NewTemplate,
) -> Result<ResumeTemplateRow, sqlx::Error> {
    let row = sqlx::query_as::<_, ResumeTemplateRow>(
        r#"
        UPDATE resume_templates
        SET name = $2, title = $3, description = $4, preview_data = $5,
            html_template = $6, keywords = $7, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(template_id)
    .bind(&template.name)
    .bind(&template.title)
    .bind(&template.description)
    .bind(&template.preview_data)
    .bind(&template.html_template)
    .bind(&template.keywords)
    .fetch_one(pool)
    .await?;

    info!("Updated resume template {} ({})", row.id, row.name);
    Ok(row)
}

/// Resumes are owner-scoped: a resume belonging to another user is not found.
pub async fn find_resume(
    pool: &PgPool,
    resume_id: Uuid,
    user_id: Uuid,
) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1 AND user_id = $2")
        .bind(resume_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}
