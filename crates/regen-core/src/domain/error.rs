// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (they travel through the render queue and the event intake)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    #[error("Invalid template '{path}': {reason}")]
    InvalidTemplate { path: String, reason: String },

    #[error("Invalid file extension '{0}': expected a leading '.' followed by a name")]
    InvalidExtension(String),

    #[error("Unknown consumer scope '{0}': expected 'dependents' or 'references'")]
    InvalidConsumerScope(String),

    #[error("Render job of kind '{kind}' has no target paths")]
    EmptyJob { kind: String },

    #[error("Invalid solution manifest: {0}")]
    InvalidManifest(String),

    // ========================================================================
    // Topology Errors
    // ========================================================================
    #[error("Project '{0}' is declared more than once")]
    DuplicateProject(String),

    #[error("Project '{from}' references unknown project '{to}'")]
    UnknownReference { from: String, to: String },

    #[error("Unknown project '{0}'")]
    UnknownProject(String),
}

impl DomainError {
    /// Convenience constructor for template parse failures.
    pub fn invalid_template(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidTemplate { path, reason } => vec![
                format!("Template '{}' could not be compiled", path),
                format!("Details: {}", reason),
                "Other templates keep working; fix and save the file to reload it".into(),
            ],
            Self::InvalidExtension(ext) => vec![
                format!("'{}' is not a valid extension", ext),
                "Extensions look like '.tst' or '.cs'".into(),
            ],
            Self::InvalidConsumerScope(_) => vec![
                "Use 'dependents' to render projects that reference the template's project".into(),
                "Use 'references' to render projects the template's project references".into(),
            ],
            Self::UnknownReference { from, to } => vec![
                format!("Project '{}' lists '{}' in its references", from, to),
                "Declare the referenced project in the solution manifest".into(),
            ],
            Self::DuplicateProject(name) => vec![
                format!("Rename one of the '{}' projects", name),
                "Project names must be unique within a solution".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidTemplate { .. }
            | Self::InvalidExtension(_)
            | Self::InvalidConsumerScope(_)
            | Self::InvalidManifest(_) => ErrorCategory::Validation,
            Self::DuplicateProject(_) | Self::UnknownReference { .. } => ErrorCategory::Topology,
            Self::UnknownProject(_) => ErrorCategory::NotFound,
            Self::EmptyJob { .. } => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Topology,
    NotFound,
    Internal,
}
