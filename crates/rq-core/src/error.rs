//! # AppError
//!
//! Centralized error handling for the Rusty-QA workspace.
//! Maps board-level failures to actionable error types.

use thiserror::Error;

/// The primary error type for all rq-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Question, Answer)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Text rejected by the validator (e.g., too short, forbidden pattern)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// The persistence collaborator reported a failure (e.g., DB down)
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// Anything else that should never reach a user
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(kind: &str, id: impl ToString) -> Self {
        Self::NotFound(kind.to_string(), id.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// A specialized Result type for Rusty-QA logic.
pub type Result<T> = std::result::Result<T, AppError>;
