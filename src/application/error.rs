//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("record {index} (pmid {}) failed: {source}", .pmid.as_deref().unwrap_or("?"))]
    RecordFailed {
        index: usize,
        pmid: Option<String>,
        #[source]
        source: DomainError,
    },

    #[error("invalid range: {from}..={to}")]
    InvalidRange { from: u32, to: u32 },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
