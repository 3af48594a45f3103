//! Schema Validator — static checks of a template against the field schema.
//!
//! Validation never fails and never short-circuits: every directive is
//! checked independently and all problems are returned together so the
//! template author sees the full list in one pass.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::schema::{FieldSchema, FieldType};
use crate::template::directive::{Command, Directive, MalformedMarker, THEME_COLOR_FIELD};
use crate::template::scanner::{scan, ScanItem};
use crate::template::tree::TemplateTree;
use crate::template::{TemplateError, DEFAULT_MAX_DEPTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    CommandNotSupported,
    FieldNotFound,
    ForEachInRequiresList,
    MissingCloseCommand,
    CommandDoesNotSupportClosing,
    MalformedDirective,
    NestingTooDeep,
}

impl ValidationErrorKind {
    pub fn message(&self) -> &'static str {
        match self {
            Self::CommandNotSupported => "Command is not supported",
            Self::FieldNotFound => "Field is not found",
            Self::ForEachInRequiresList => "ForEachIn command used only with lists",
            Self::MissingCloseCommand => "Close command not found",
            Self::CommandDoesNotSupportClosing => "Command not support closing",
            Self::MalformedDirective => "Directive marker is malformed",
            Self::NestingTooDeep => "Directives are nested too deeply",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetails {
    Directive(Directive),
    Marker(MalformedMarker),
    Limit { limit: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    /// Human-readable message shown to the template author.
    pub error: String,
    pub details: ErrorDetails,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, details: ErrorDetails) -> Self {
        Self {
            kind,
            error: kind.message().to_string(),
            details,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct Validator<'s, S: FieldSchema + ?Sized> {
    schema: &'s S,
    max_depth: usize,
}

impl<'s, S: FieldSchema + ?Sized> Validator<'s, S> {
    pub fn new(schema: &'s S) -> Self {
        Self {
            schema,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn validate(&self, html: &str) -> ValidationReport {
        let mut errors = Vec::new();

        for item in scan(html) {
            match item {
                ScanItem::Directive(directive) => self.check_directive(directive, &mut errors),
                ScanItem::Malformed(marker) => errors.push(ValidationError::new(
                    ValidationErrorKind::MalformedDirective,
                    ErrorDetails::Marker(marker),
                )),
            }
        }

        if let Err(TemplateError::RecursionLimitExceeded { limit }) =
            TemplateTree::parse(html, self.max_depth)
        {
            errors.push(ValidationError::new(
                ValidationErrorKind::NestingTooDeep,
                ErrorDetails::Limit { limit },
            ));
        }

        debug!(errors = errors.len(), "Validated template");
        ValidationReport { errors }
    }

    fn check_directive(&self, directive: Directive, errors: &mut Vec<ValidationError>) {
        let mut kinds = Vec::new();

        if !directive.command.is_supported() {
            kinds.push(ValidationErrorKind::CommandNotSupported);
        }

        let field = directive
            .field_key
            .as_deref()
            .and_then(|name| self.schema.find_field_by_name(name));

        if field.is_none()
            && directive
                .field_key
                .as_deref()
                .is_some_and(|name| name != THEME_COLOR_FIELD)
        {
            kinds.push(ValidationErrorKind::FieldNotFound);
        }

        if let Some(field) = field {
            if directive.command == Command::ForEachIn && field.field_type != FieldType::List {
                kinds.push(ValidationErrorKind::ForEachInRequiresList);
            }
        }

        if directive.command.is_block() && directive.closing_marker.is_none() {
            kinds.push(ValidationErrorKind::MissingCloseCommand);
        }

        if directive.command == Command::Value && directive.closing_marker.is_some() {
            kinds.push(ValidationErrorKind::CommandDoesNotSupportClosing);
        }

        errors.extend(
            kinds
                .into_iter()
                .map(|kind| ValidationError::new(kind, ErrorDetails::Directive(directive.clone()))),
        );
    }
}
