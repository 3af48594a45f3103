use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::template::DataContext;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeTemplateRow {
    pub id: Uuid,
    pub name: String,
    pub title: String,
    pub description: Option<String>,
    /// Example answers used to render the template preview.
    pub preview_data: Value,
    pub html_template: String,
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResumeTemplateRow {
    pub fn preview_context(&self) -> DataContext {
        self.preview_data.as_object().cloned().unwrap_or_default()
    }
}

/// Validated fields for a new template row.
#[derive(Debug, Clone)]
pub struct NewTemplate {
    pub name: String,
    pub title: String,
    pub description: Option<String>,
    pub preview_data: Value,
    pub html_template: String,
    pub keywords: Vec<String>,
}
