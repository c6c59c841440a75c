//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The status value is outside the enumeration.
    #[error(transparent)]
    InvalidStatus(#[from] ParseTaskStatusError),
}

/// Error returned while parsing task statuses from untrusted input or
/// persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid task status: {0}")]
pub struct ParseTaskStatusError(pub String);
