//! Unified error handling for regen-core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with rich context and user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for regen-core operations.
///
/// This enum wraps all possible errors that can occur when using regen-core,
/// providing a unified interface for error handling.
#[derive(Debug, Error, Clone)]
pub enum RegenError {
    /// Errors from the domain layer (validation, topology).
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (orchestration failures).
    #[error("Application error: {0}")]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl RegenError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Check your setup and try again".into(),
            ],
            Self::Internal { .. } => vec![
                "This appears to be a bug in regen".into(),
                "Please report it with the output of a -vvv run".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Topology => ErrorCategory::Configuration,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Render,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type RegenResult<T> = Result<T, RegenError>;

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn render_failures_are_render_category() {
        let err: RegenError = ApplicationError::RenderingFailed {
            path: PathBuf::from("/a.cs"),
            reason: "boom".into(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Render);
    }

    #[test]
    fn topology_errors_are_configuration() {
        let err: RegenError = DomainError::DuplicateProject("A".into()).into();
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }
}
