use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::template::directive::THEME_COLOR_FIELD;
use crate::template::DataContext;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub template_id: Uuid,
    pub template_color: Option<String>,
    /// Stored form answers keyed by dot-qualified field name.
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResumeRow {
    /// Answers as a data context, with the chosen color exposed as
    /// `Template.Theme.Color` unless the answers already carry one.
    /// A non-object `data` column yields a context holding only the color.
    pub fn data_context(&self) -> DataContext {
        let mut context = self.data.as_object().cloned().unwrap_or_default();
        if let Some(color) = &self.template_color {
            context
                .entry(THEME_COLOR_FIELD)
                .or_insert_with(|| Value::String(color.clone()));
        }
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::template::Resolver;

    fn resume(template_color: Option<&str>, data: Value) -> ResumeRow {
        ResumeRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            template_id: Uuid::new_v4(),
            template_color: template_color.map(str::to_string),
            data,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_template_color_renders_through_theme_field() {
        let row = resume(Some("#336699"), json!({"Personal.Details.Name": "Ada"}));
        let html = Resolver::default()
            .resolve(
                "<h1 style=\"color:<!--[Value:Template.Theme.Color]-->\"><!--[Value:Personal.Details.Name]--></h1>",
                &row.data_context(),
            )
            .unwrap();
        assert_eq!(html, "<h1 style=\"color:#336699\">Ada</h1>");
    }

    #[test]
    fn test_stored_theme_color_wins() {
        let row = resume(Some("#336699"), json!({"Template.Theme.Color": "#000000"}));
        assert_eq!(row.data_context()["Template.Theme.Color"], json!("#000000"));
    }

    #[test]
    fn test_no_color_leaves_data_untouched() {
        let row = resume(None, json!({"Personal.Details.Name": "Ada"}));
        let context = row.data_context();
        assert_eq!(context.len(), 1);
        assert!(!context.contains_key(THEME_COLOR_FIELD));
    }

    #[test]
    fn test_non_object_data_keeps_color() {
        let row = resume(Some("red"), json!(null));
        assert_eq!(row.data_context()[THEME_COLOR_FIELD], json!("red"));
    }
}
