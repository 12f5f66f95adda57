//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors are per-record fatal mapping failures.
/// They never describe I/O; one failing record leaves its siblings untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("missing required field: {entity}.{field}")]
    MissingRequiredField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("invalid date ({reason}): year={year:?} month={month:?} day={day:?}")]
    InvalidDate {
        year: Option<String>,
        month: Option<String>,
        day: Option<String>,
        reason: String,
    },

    #[error("schema shape mismatch: expected <{expected}> under record node")]
    SchemaShapeMismatch { expected: String },

    #[error("invalid number in {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

impl DomainError {
    pub fn missing(entity: &'static str, field: &'static str) -> Self {
        Self::MissingRequiredField { entity, field }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
