//! Axum route handlers for the Template API.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::db;
use crate::errors::AppError;
use crate::models::template::{NewTemplate, ResumeTemplateRow};
use crate::state::AppState;
use crate::template::{DataContext, Resolver, ValidationReport, Validator};

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidateRequest {
    pub html: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub preview_data: Value,
    pub html_template: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl CreateTemplateRequest {
    fn into_new_template(self) -> Result<NewTemplate, AppError> {
        let name = self.name.trim().to_string();
        let title = self.title.trim().to_string();
        let html_template = self.html_template.trim().to_string();

        if name.is_empty() || title.is_empty() {
            return Err(AppError::Validation(
                "name and title cannot be empty".to_string(),
            ));
        }
        if html_template.is_empty() {
            return Err(AppError::Validation(
                "html_template cannot be empty".to_string(),
            ));
        }
        if !self.preview_data.is_object() {
            return Err(AppError::Validation(
                "preview_data must be an object".to_string(),
            ));
        }

        Ok(NewTemplate {
            name,
            title,
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            preview_data: self.preview_data,
            html_template,
            keywords: self
                .keywords
                .into_iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
        })
    }
}

/// Partial update. Absent fields keep their stored value; an empty
/// description clears it.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTemplateRequest {
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub preview_data: Option<Value>,
    pub html_template: Option<String>,
    pub keywords: Option<Vec<String>>,
}

impl UpdateTemplateRequest {
    /// Trims and checks the supplied fields.
    fn normalized(self) -> Result<Self, AppError> {
        let non_empty = |field: &str, value: Option<String>| -> Result<Option<String>, AppError> {
            match value.map(|v| v.trim().to_string()) {
                Some(v) if v.is_empty() => {
                    Err(AppError::Validation(format!("{field} cannot be empty")))
                }
                other => Ok(other),
            }
        };

        let name = non_empty("name", self.name)?;
        let title = non_empty("title", self.title)?;
        let html_template = non_empty("html_template", self.html_template)?;

        if name.is_none()
            && title.is_none()
            && html_template.is_none()
            && self.description.is_none()
            && self.preview_data.is_none()
            && self.keywords.is_none()
        {
            return Err(AppError::Validation("no fields to update".to_string()));
        }
        if self.preview_data.as_ref().is_some_and(|d| !d.is_object()) {
            return Err(AppError::Validation(
                "preview_data must be an object".to_string(),
            ));
        }

        Ok(Self {
            name,
            title,
            description: self.description.map(|d| d.trim().to_string()),
            preview_data: self.preview_data,
            html_template,
            keywords: self.keywords.map(|keywords| {
                keywords
                    .into_iter()
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
                    .collect()
            }),
        })
    }

    fn apply(self, row: ResumeTemplateRow) -> NewTemplate {
        NewTemplate {
            name: self.name.unwrap_or(row.name),
            title: self.title.unwrap_or(row.title),
            description: match self.description {
                Some(d) => Some(d).filter(|d| !d.is_empty()),
                None => row.description,
            },
            preview_data: self.preview_data.unwrap_or(row.preview_data),
            html_template: self.html_template.unwrap_or(row.html_template),
            keywords: self.keywords.unwrap_or(row.keywords),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Shared helpers
// ────────────────────────────────────────────────────────────────────────────

/// Resolves on the blocking pool; templates are CPU-bound string work.
pub async fn render_blocking(
    resolver: Resolver,
    template: String,
    data: DataContext,
) -> Result<String, AppError> {
    let html = tokio::task::spawn_blocking(move || resolver.resolve(&template, &data))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Render task failed: {e}")))??;
    Ok(html)
}

/// Validates `html` against a fresh snapshot of the live schema.
async fn validate_against_schema(state: &AppState, html: &str) -> Result<ValidationReport, AppError> {
    let snapshot = state.schema.snapshot().await?;
    Ok(Validator::new(&snapshot)
        .with_max_depth(state.resolver.max_depth())
        .validate(html))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/templates/validate
///
/// Returns every problem in the submitted HTML; an empty list means the
/// template can be saved.
pub async fn handle_validate(
    State(state): State<AppState>,
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<Json<ValidationReport>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    if request.html.trim().is_empty() {
        return Err(AppError::Validation("html cannot be empty".to_string()));
    }

    let report = validate_against_schema(&state, &request.html).await?;
    info!("Validated template: {} errors", report.errors.len());
    Ok(Json(report))
}

/// POST /api/v1/templates
///
/// Stores a new template. The HTML must pass validation first.
pub async fn handle_create_template(
    State(state): State<AppState>,
    payload: Result<Json<CreateTemplateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ResumeTemplateRow>), AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let new_template = request.into_new_template()?;

    let report = validate_against_schema(&state, &new_template.html_template).await?;
    if !report.is_valid() {
        return Err(AppError::InvalidTemplate(report));
    }

    let row = db::insert_template(&state.db, &new_template).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PATCH /api/v1/templates/:id
///
/// Updates a stored template. A new `html_template` must pass validation
/// before anything is written.
pub async fn handle_update_template(
    State(state): State<AppState>,
    Path(template_id): Path<Uuid>,
    payload: Result<Json<UpdateTemplateRequest>, JsonRejection>,
) -> Result<Json<ResumeTemplateRow>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let request = request.normalized()?;

    if let Some(html) = &request.html_template {
        let report = validate_against_schema(&state, html).await?;
        if !report.is_valid() {
            return Err(AppError::InvalidTemplate(report));
        }
    }

    let current = db::find_template(&state.db, template_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("ResumeTemplate {template_id} not found")))?;

    let row = db::update_template(&state.db, template_id, &request.apply(current)).await?;
    Ok(Json(row))
}

/// GET /api/v1/templates/:id/html
///
/// Renders the template against its own preview data.
pub async fn handle_preview_template(
    State(state): State<AppState>,
    Path(template_id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let template = db::find_template(&state.db, template_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("ResumeTemplate {template_id} not found")))?;

    let data = template.preview_context();
    let html = render_blocking(state.resolver, template.html_template, data).await?;
    Ok(Html(html))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(preview_data: Value) -> CreateTemplateRequest {
        CreateTemplateRequest {
            name: "  classic ".to_string(),
            title: "Classic".to_string(),
            description: Some("   ".to_string()),
            preview_data,
            html_template: " <p><!--[Value:A.B.C]--></p> ".to_string(),
            keywords: vec!["simple".to_string(), " ".to_string()],
        }
    }

    #[test]
    fn test_create_request_is_trimmed() {
        let new_template = request(json!({})).into_new_template().unwrap();
        assert_eq!(new_template.name, "classic");
        assert_eq!(new_template.html_template, "<p><!--[Value:A.B.C]--></p>");
        assert!(new_template.description.is_none());
        assert_eq!(new_template.keywords, vec!["simple".to_string()]);
    }

    #[test]
    fn test_preview_data_must_be_object() {
        assert!(matches!(
            request(json!([1, 2])).into_new_template(),
            Err(AppError::Validation(_))
        ));
    }

    fn stored_row() -> ResumeTemplateRow {
        ResumeTemplateRow {
            id: Uuid::new_v4(),
            name: "classic".to_string(),
            title: "Classic".to_string(),
            description: Some("One column".to_string()),
            preview_data: json!({"A.B.C": "x"}),
            html_template: "<p><!--[Value:A.B.C]--></p>".to_string(),
            keywords: vec!["simple".to_string()],
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_update_keeps_absent_fields() {
        let update = UpdateTemplateRequest {
            title: Some(" Modern ".to_string()),
            ..Default::default()
        };
        let merged = update.normalized().unwrap().apply(stored_row());
        assert_eq!(merged.title, "Modern");
        assert_eq!(merged.name, "classic");
        assert_eq!(merged.description.as_deref(), Some("One column"));
        assert_eq!(merged.html_template, "<p><!--[Value:A.B.C]--></p>");
    }

    #[test]
    fn test_update_empty_description_clears_it() {
        let update = UpdateTemplateRequest {
            description: Some("  ".to_string()),
            ..Default::default()
        };
        let merged = update.normalized().unwrap().apply(stored_row());
        assert!(merged.description.is_none());
    }

    #[test]
    fn test_update_rejects_blank_and_empty_requests() {
        assert!(matches!(
            UpdateTemplateRequest::default().normalized(),
            Err(AppError::Validation(_))
        ));
        let blank_html = UpdateTemplateRequest {
            html_template: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            blank_html.normalized(),
            Err(AppError::Validation(_))
        ));
        let list_preview = UpdateTemplateRequest {
            preview_data: Some(json!([])),
            ..Default::default()
        };
        assert!(matches!(
            list_preview.normalized(),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_render_blocking() {
        let data = json!({"A.B.C": "x"}).as_object().cloned().unwrap();
        let html = render_blocking(Resolver::default(), "<!--[Value:A.B.C]-->".to_string(), data)
            .await
            .unwrap();
        assert_eq!(html, "x");
    }

    #[tokio::test]
    async fn test_render_blocking_maps_depth_error() {
        let template = "<!--[Exists:A.B]--><!--[Exists:C.D]-->x<!--[EndExists:C.D]--><!--[EndExists:A.B]-->";
        let err = render_blocking(Resolver::new(1), template.to_string(), DataContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Template(_)));
    }
}
