//! Schema sources — pluggable, trait-based loading of the live field schema.
//!
//! `AppState` holds an `Arc<dyn SchemaSource>`. Production reads Postgres;
//! tests hand in a fixed snapshot.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::schema::{FieldSchemaEntry, FieldType, SchemaSnapshot};

#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// Captures the current schema. The snapshot never changes afterwards.
    async fn snapshot(&self) -> Result<SchemaSnapshot, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// PgSchemaSource
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, FromRow)]
struct FieldSchemaRow {
    name: String,
    type_name: String,
    title: Option<String>,
    is_persistent_data: Option<bool>,
}

pub struct PgSchemaSource {
    pool: PgPool,
}

impl PgSchemaSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SchemaSource for PgSchemaSource {
    async fn snapshot(&self) -> Result<SchemaSnapshot, AppError> {
        let rows = sqlx::query_as::<_, FieldSchemaRow>(
            r#"
            SELECT f.name, t.name AS type_name, f.title, f.is_persistent_data
            FROM resume_fields f
            JOIN resume_field_types t ON t.id = f.type_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let snapshot = SchemaSnapshot::from_entries(rows.into_iter().map(row_to_entry));
        if snapshot.is_empty() {
            warn!("Field schema is empty; every field directive will fail validation");
        } else {
            info!("Loaded field schema: {} fields", snapshot.len());
        }

        Ok(snapshot)
    }
}

/// Unrecognized type names are kept, so the field is still found by name.
fn row_to_entry(row: FieldSchemaRow) -> FieldSchemaEntry {
    let field_type = FieldType::parse(&row.type_name);
    if !field_type.is_known() {
        warn!("Field '{}' has unrecognized type '{}'", row.name, field_type);
    }
    FieldSchemaEntry {
        name: row.name,
        field_type,
        title: row.title,
        is_persistent_data: row.is_persistent_data.unwrap_or(false),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// StaticSchemaSource
// ────────────────────────────────────────────────────────────────────────────

/// Serves the same snapshot on every call.
#[cfg(test)]
pub struct StaticSchemaSource(pub SchemaSnapshot);

#[cfg(test)]
#[async_trait]
impl SchemaSource for StaticSchemaSource {
    async fn snapshot(&self) -> Result<SchemaSnapshot, AppError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSchema;

    #[test]
    fn test_row_with_unknown_type_is_kept() {
        let row = FieldSchemaRow {
            name: "A.B.C".to_string(),
            type_name: "Signature".to_string(),
            title: None,
            is_persistent_data: None,
        };
        let snapshot = SchemaSnapshot::from_entries([row_to_entry(row)]);
        let entry = snapshot.find_field_by_name("A.B.C").unwrap();
        assert_eq!(entry.field_type, FieldType::Other("Signature".to_string()));
    }

    #[test]
    fn test_row_maps_to_entry() {
        let row = FieldSchemaRow {
            name: "Personal.Details.Email".to_string(),
            type_name: "Single Line Text".to_string(),
            title: Some("Email".to_string()),
            is_persistent_data: Some(true),
        };
        let entry = row_to_entry(row);
        assert_eq!(entry.field_type, FieldType::SingleLineText);
        assert!(entry.is_persistent_data);
    }

    #[tokio::test]
    async fn test_static_source_returns_snapshot() {
        let source = StaticSchemaSource(SchemaSnapshot::from_entries(vec![
            FieldSchemaEntry::new("Education.Form.List", FieldType::List),
        ]));
        let snapshot = source.snapshot().await.unwrap();
        assert!(snapshot.find_field_by_name("Education.Form.List").is_some());
    }
}
