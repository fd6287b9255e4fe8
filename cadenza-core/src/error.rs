//! Error types for the cadenza ecosystem.

use thiserror::Error;

/// Errors that can occur in cadenza operations.
#[derive(Error, Debug)]
pub enum CadenzaError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("not authorized: {0}")]
    Unauthorized(String),

    #[error("invalid recurrence: {0}")]
    InvalidRecurrence(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for cadenza operations.
pub type CadenzaResult<T> = Result<T, CadenzaError>;
