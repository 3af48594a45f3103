// Template engine: comment directives embedded in admin-authored HTML.
// Scanner → arena tree → resolver renders; scanner + schema → validator checks.
// Pure computation, no I/O: handlers run resolution inside spawn_blocking.

pub mod context;
pub mod directive;
pub mod handlers;
pub mod resolver;
pub mod scanner;
pub mod tree;
pub mod validator;

use thiserror::Error;

pub use context::DataContext;
pub use resolver::Resolver;
pub use validator::{ValidationReport, Validator};

/// Nesting depth allowed when no configuration overrides it.
pub const DEFAULT_MAX_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Template nesting exceeds the limit of {limit} levels")]
    RecursionLimitExceeded { limit: usize },
}
