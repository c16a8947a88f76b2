//! # AppError
//!
//! Centralized error handling for DevForum.
//! Every failure is local to the single mutation that raised it.

use thiserror::Error;

/// The primary error type for all df-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Target not found (e.g., Post, Comment, Community)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Rejected input (e.g., blank title, empty comment body)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Identifier already taken (e.g., duplicate comment id in a forest)
    #[error("conflict: {0}")]
    Conflict(String),

    /// A logic bug: negative counters, a malformed comment forest
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl AppError {
    pub fn not_found(kind: &str, id: impl ToString) -> Self {
        AppError::NotFound(kind.to_string(), id.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(..))
    }
}

/// A specialized Result type for DevForum logic.
pub type Result<T> = std::result::Result<T, AppError>;
