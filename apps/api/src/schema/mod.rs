//! Field schema — the admin-defined fields that template directives refer to.
//!
//! The validator only needs name → type lookups against an immutable
//! snapshot; loading the snapshot is the job of a [`SchemaSource`].

pub mod source;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use source::{PgSchemaSource, SchemaSource};
#[cfg(test)]
pub use source::StaticSchemaSource;

/// A schema field type. Type names the engine does not know are kept verbatim
/// so the field still resolves by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Check,
    Date,
    Image,
    List,
    MultiLineText,
    Rank,
    Select,
    SingleLineText,
    Other(String),
}

impl FieldType {
    pub const KNOWN: [FieldType; 8] = [
        FieldType::Check,
        FieldType::Date,
        FieldType::Image,
        FieldType::List,
        FieldType::MultiLineText,
        FieldType::Rank,
        FieldType::Select,
        FieldType::SingleLineText,
    ];

    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        FieldType::KNOWN
            .into_iter()
            .find(|t| t.name() == raw)
            .unwrap_or_else(|| FieldType::Other(raw.to_string()))
    }

    pub fn name(&self) -> &str {
        match self {
            FieldType::Check => "Check",
            FieldType::Date => "Date",
            FieldType::Image => "Image",
            FieldType::List => "List",
            FieldType::MultiLineText => "Multi Line Text",
            FieldType::Rank => "Rank",
            FieldType::Select => "Select",
            FieldType::SingleLineText => "Single Line Text",
            FieldType::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, FieldType::Other(_))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for FieldType {
    fn from(raw: String) -> Self {
        FieldType::parse(&raw)
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.name().to_string()
    }
}

/// One schema field. Only `name` and `field_type` matter to the template engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchemaEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub is_persistent_data: bool,
}

impl FieldSchemaEntry {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            title: None,
            is_persistent_data: false,
        }
    }
}

/// Read-only field lookup consumed by the validator.
pub trait FieldSchema {
    fn find_field_by_name(&self, name: &str) -> Option<&FieldSchemaEntry>;
}

/// Immutable name → field map captured for one validation call.
#[derive(Debug, Clone, Default)]
pub struct SchemaSnapshot {
    fields: HashMap<String, FieldSchemaEntry>,
}

impl SchemaSnapshot {
    /// Later entries with a duplicate name replace earlier ones.
    pub fn from_entries(entries: impl IntoIterator<Item = FieldSchemaEntry>) -> Self {
        Self {
            fields: entries
                .into_iter()
                .map(|entry| (entry.name.clone(), entry))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FieldSchema for SchemaSnapshot {
    fn find_field_by_name(&self, name: &str) -> Option<&FieldSchemaEntry> {
        self.fields.get(name)
    }
}
