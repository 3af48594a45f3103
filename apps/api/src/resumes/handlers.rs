//! Axum route handlers for the Resume API.

use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::db;
use crate::errors::AppError;
use crate::state::AppState;
use crate::template::handlers::render_blocking;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// GET /api/v1/resumes/:id/html
///
/// Renders the resume's answers through its template. Shared by the HTML
/// preview and the external PDF exporter.
pub async fn handle_resume_html(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Html<String>, AppError> {
    let resume = db::find_resume(&state.db, resume_id, params.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?;

    let template = db::find_template(&state.db, resume.template_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("ResumeTemplate {} not found", resume.template_id))
        })?;

    let html = render_blocking(state.resolver, template.html_template, resume.data_context()).await?;
    info!("Rendered resume {resume_id} with template {}", template.id);
    Ok(Html(html))
}
