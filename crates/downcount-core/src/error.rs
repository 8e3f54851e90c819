//! Core error types.

use thiserror::Error;

/// Errors raised while building placeholder definitions from templates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A template references itself, directly or through other templates.
    ///
    /// The offending entry is dropped from the registry; the rest of the
    /// build proceeds.
    #[error("template '{name}' references itself through '{via}'")]
    CyclicTemplate { name: String, via: String },
}

/// Result type for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;
