//! Application layer errors.
//!
//! These errors represent failures in orchestration, not business logic.
//! Business logic errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A path does not resolve to an entry of any project.
    #[error("No project entry for {path}")]
    EntryNotFound { path: PathBuf },

    /// A project's on-disk root could not be determined.
    #[error("Cannot determine root directory of project '{project}'")]
    ProjectRootUnknown { project: String },

    /// Metadata extraction failed for a target file.
    #[error("Metadata unavailable for {path}: {reason}")]
    MetadataUnavailable { path: PathBuf, reason: String },

    /// Template rendering failed.
    #[error("Rendering {path} failed: {reason}")]
    RenderingFailed { path: PathBuf, reason: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// Lock poisoned by a panicking thread.
    #[error("Shared state lock poisoned: {name}")]
    LockPoisoned { name: &'static str },

    /// The event intake has shut down.
    #[error("Event intake closed")]
    IntakeClosed,

    /// Persisting project bookkeeping failed.
    #[error("Failed to persist project state at {path}: {reason}")]
    PersistFailed { path: PathBuf, reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::EntryNotFound { path } => vec![
                format!("'{}' is not inside any project root", path.display()),
                "Check the project roots in the solution manifest".into(),
            ],
            Self::ProjectRootUnknown { project } => vec![
                format!("Project '{}' has no usable root directory", project),
                "Make sure the root exists and is readable".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have read/write permissions".into(),
            ],
            Self::RenderingFailed { path, .. } => vec![
                format!("Rendering of '{}' will be retried on its next change", path.display()),
            ],
            Self::LockPoisoned { .. } => vec![
                "A worker thread panicked while holding shared state".into(),
                "Restart the watcher".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EntryNotFound { .. } => ErrorCategory::NotFound,
            Self::ProjectRootUnknown { .. } => ErrorCategory::Configuration,
            Self::MetadataUnavailable { .. } | Self::RenderingFailed { .. } => {
                ErrorCategory::Render
            }
            Self::FilesystemError { .. }
            | Self::LockPoisoned { .. }
            | Self::IntakeClosed
            | Self::PersistFailed { .. } => ErrorCategory::Internal,
        }
    }
}
