//! Domain-level errors (no external dependencies)

use std::fmt;

use thiserror::Error;

/// A single rejected field of the details form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// JSON field name, e.g. `hierarchyAttribute`
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Domain errors represent hierarchy rule violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("invalid form: {}", join_fields(.0))]
    InvalidForm(Vec<FieldError>),

    #[error("details form is read-only in view mode")]
    ReadOnly,

    #[error("payload id {actual} does not match selected node {expected}")]
    IdMismatch { expected: String, actual: String },
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
