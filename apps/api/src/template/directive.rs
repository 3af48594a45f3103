//! Directive model and the comment-marker grammar.
//!
//! # Marker grammar
//! - Opening: `<!--[<Command>:<Key>]-->` on a single line
//! - Closing: `<!--[End<Command>:<Key>]-->` (block commands only)
//!
//! `<Key>` is dot-qualified. Keys with more than two segments name a field
//! (`Education.Form.List.School`); shorter keys name a whole form (`Step.Form`).

use serde::{Deserialize, Serialize};

pub const OPEN_SENTINEL: &str = "<!--[";
pub const CLOSE_SENTINEL: &str = "<!--[End";
pub const MARKER_TERMINATOR: &str = "]-->";

/// Pseudo-field carrying the chosen template color. Never part of the schema.
pub const THEME_COLOR_FIELD: &str = "Template.Theme.Color";

// ────────────────────────────────────────────────────────────────────────────
// Command
// ────────────────────────────────────────────────────────────────────────────

/// A directive command. Unknown command text is kept verbatim so the
/// validator can report it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Command {
    Exists,
    NotExists,
    Value,
    ForEachIn,
    Unsupported(String),
}

impl Command {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Exists" => Command::Exists,
            "NotExists" => Command::NotExists,
            "Value" => Command::Value,
            "ForEachIn" => Command::ForEachIn,
            other => Command::Unsupported(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Command::Exists => "Exists",
            Command::NotExists => "NotExists",
            Command::Value => "Value",
            Command::ForEachIn => "ForEachIn",
            Command::Unsupported(raw) => raw,
        }
    }

    /// Commands that wrap a body and therefore need a closing marker.
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            Command::Exists | Command::NotExists | Command::ForEachIn
        )
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Command::Unsupported(_))
    }
}

impl From<String> for Command {
    fn from(raw: String) -> Self {
        Command::parse(&raw)
    }
}

impl From<Command> for String {
    fn from(command: Command) -> Self {
        command.as_str().to_string()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Spans and directives
// ────────────────────────────────────────────────────────────────────────────

/// Half-open byte range into the template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn slice<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end]
    }
}

/// One directive found by the scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    pub command: Command,
    /// Key exactly as written in the opening marker.
    pub target_key: String,
    /// First two key segments (`Step.Form`).
    pub form_key: String,
    /// Full key when it addresses a field (more than two segments).
    pub field_key: Option<String>,
    pub start_index: usize,
    pub end_index: usize,
    pub opening_marker: String,
    pub closing_marker: Option<String>,
    /// Text between the opening and closing markers.
    pub body: Option<Span>,
}

/// Text starting with the sentinel that does not follow the opening grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalformedMarker {
    pub start_index: usize,
    pub text: String,
}

/// Splits a target key into `(form_key, field_key)`.
pub fn split_key(key: &str) -> (String, Option<String>) {
    let segments: Vec<&str> = key.split('.').collect();
    let form_key = if segments.len() >= 2 {
        format!("{}.{}", segments[0], segments[1])
    } else {
        key.to_string()
    };
    let field_key = (segments.len() > 2).then(|| key.to_string());
    (form_key, field_key)
}

/// Parent key of a dotted name: everything before the last segment.
pub fn parent_key(key: &str) -> Option<&str> {
    key.rfind('.').map(|i| &key[..i])
}

pub fn closing_marker(command: &str, key: &str) -> String {
    format!("{CLOSE_SENTINEL}{command}:{key}{MARKER_TERMINATOR}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_field_key() {
        let (form, field) = split_key("Education.Form.List.School");
        assert_eq!(form, "Education.Form");
        assert_eq!(field.as_deref(), Some("Education.Form.List.School"));
    }

    #[test]
    fn test_split_form_key() {
        let (form, field) = split_key("Personal.Details");
        assert_eq!(form, "Personal.Details");
        assert!(field.is_none());
    }

    #[test]
    fn test_split_single_segment() {
        let (form, field) = split_key("Orphan");
        assert_eq!(form, "Orphan");
        assert!(field.is_none());
    }

    #[test]
    fn test_parent_key() {
        assert_eq!(
            parent_key("Education.Form.List.School"),
            Some("Education.Form.List")
        );
        assert_eq!(parent_key("Orphan"), None);
    }

    #[test]
    fn test_closing_marker_has_no_separator() {
        assert_eq!(
            closing_marker("ForEachIn", "A.B.C"),
            "<!--[EndForEachIn:A.B.C]-->"
        );
    }

    #[test]
    fn test_command_round_trip_unknown() {
        let cmd = Command::parse("Repeat");
        assert_eq!(cmd, Command::Unsupported("Repeat".to_string()));
        assert_eq!(cmd.as_str(), "Repeat");
        assert!(!cmd.is_supported());
        assert!(!cmd.is_block());
    }

    #[test]
    fn test_command_serializes_as_text() {
        let json = serde_json::to_string(&Command::ForEachIn).unwrap();
        assert_eq!(json, "\"ForEachIn\"");
    }
}
