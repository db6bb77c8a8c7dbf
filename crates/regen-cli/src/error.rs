//! CLI error handling.
//!
//! Every failure that reaches `main` is a [`CliError`]: it knows its
//! suggestions, its category and the exit code that category maps to.

use std::{error::Error, io, path::PathBuf};

use owo_colors::OwoColorize;
use regen_adapters::ManifestError;
use regen_core::error::{ErrorCategory as CoreCategory, RegenError};
use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("No solution manifest at {path}")]
    SolutionNotFound { path: PathBuf },

    #[error("{path} is not a template definition of this solution")]
    TemplateNotFound { path: PathBuf },

    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn Error + Send + Sync>>,
    },

    #[error("Cannot load solution: {0}")]
    Manifest(#[from] ManifestError),

    #[error("{0}")]
    Core(#[from] RegenError),

    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: io::Error,
    },
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

/// Error categories, one per exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    UserError,
    NotFound,
    Configuration,
    Internal,
}

impl CliError {
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidInput { .. } => vec!["Use --help for usage information".into()],

            Self::SolutionNotFound { path } => vec![
                format!("Create {} with one [[project]] table per project", path.display()),
                "Or pass the solution directory: regen list path/to/solution".into(),
            ],

            Self::TemplateNotFound { path } => vec![
                format!(
                    "'{}' must sit inside a project root and end in the definition extension",
                    path.display()
                ),
                "List the known definitions with: regen list".into(),
            ],

            Self::ConfigError { .. } => vec![
                "Inspect the effective configuration with: regen config list".into(),
                "Environment overrides look like REGEN__WATCH__POLL_INTERVAL_MS=250".into(),
            ],

            Self::Manifest(ManifestError::Domain(e)) => e.suggestions(),
            Self::Manifest(ManifestError::Parse { path, .. }) => vec![
                format!("Fix the TOML syntax in {}", path.display()),
                "Each project is a [[project]] table with name, root and optional references".into(),
            ],
            Self::Manifest(ManifestError::Read { path, .. }) => vec![format!(
                "Check that {} exists and is readable",
                path.display()
            )],

            Self::Core(e) => e.suggestions(),

            Self::IoError { .. } => vec![
                "Check file permissions".into(),
                "Check available disk space".into(),
            ],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } => ErrorCategory::UserError,
            Self::SolutionNotFound { .. } | Self::TemplateNotFound { .. } => {
                ErrorCategory::NotFound
            }
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::Manifest(ManifestError::Read { source, .. })
                if source.kind() == io::ErrorKind::NotFound =>
            {
                ErrorCategory::NotFound
            }
            Self::Manifest(ManifestError::Read { .. }) => ErrorCategory::Internal,
            Self::Manifest(_) => ErrorCategory::Configuration,
            Self::Core(core) => match core.category() {
                CoreCategory::Validation => ErrorCategory::UserError,
                CoreCategory::NotFound => ErrorCategory::NotFound,
                CoreCategory::Configuration => ErrorCategory::Configuration,
                CoreCategory::Render | CoreCategory::Internal => ErrorCategory::Internal,
            },
            Self::IoError { .. } => ErrorCategory::Internal,
        }
    }

    /// Exit code to pass to the OS.
    ///
    /// | Category      | Code |
    /// |---------------|------|
    /// | User error    |  2   |
    /// | Not found     |  3   |
    /// | Configuration |  4   |
    /// | Internal      |  1   |
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::UserError => 2,
            ErrorCategory::NotFound => 3,
            ErrorCategory::Configuration => 4,
            ErrorCategory::Internal => 1,
        }
    }

    pub fn format_colored(&self, verbose: bool) -> String {
        let mut output = format!(
            "\n{} {}\n\n  {}\n",
            "\u{2717}".red().bold(),
            "Error:".red().bold(),
            self.to_string().red()
        );

        if verbose {
            for cause in self.causes() {
                output.push_str(&format!("\n  {} {}\n", "\u{2192}".dimmed(), cause.dimmed()));
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str(&format!("\n{}\n", "Suggestions:".yellow().bold()));
            for suggestion in suggestions {
                output.push_str(&format!("  {suggestion}\n"));
            }
        }

        if !verbose {
            output.push_str(&format!(
                "\n{} {}\n",
                "\u{2139}".blue(),
                "Use -v / --verbose for more details.".dimmed(),
            ));
        }

        output
    }

    /// [`Self::format_colored`] without ANSI codes.
    pub fn format_plain(&self, verbose: bool) -> String {
        let mut out = format!("\nError: {self}\n");

        if verbose {
            for cause in self.causes() {
                out.push_str(&format!("  Caused by: {cause}\n"));
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for s in &suggestions {
                out.push_str(&format!("  {s}\n"));
            }
        }

        if !verbose {
            out.push_str("\nUse -v / --verbose for more details.\n");
        }

        out
    }

    pub fn log(&self) {
        match self.category() {
            ErrorCategory::UserError => tracing::warn!("User error: {}", self),
            ErrorCategory::NotFound => tracing::warn!("Not found: {}", self),
            ErrorCategory::Configuration => tracing::error!("Configuration error: {}", self),
            ErrorCategory::Internal => tracing::error!("Internal error: {}", self),
        }

        if let Some(source) = self.source() {
            tracing::debug!("Caused by: {}", source);
        }
    }

    fn causes(&self) -> Vec<String> {
        let mut causes = Vec::new();
        let mut source = self.source();
        while let Some(err) = source {
            causes.push(err.to_string());
            source = err.source();
        }
        causes
    }
}

// ── IntoCli trait ─────────────────────────────────────────────────────────────

/// Attach a context message while converting a foreign error into a
/// [`CliError`].
pub trait IntoCli<T> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IntoCli<T> for Result<T, io::Error> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| CliError::IoError {
            message: f().into(),
            source: e,
        })
    }
}

impl<T> IntoCli<T> for Result<T, serde_json::Error> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| CliError::IoError {
            message: f().into(),
            source: io::Error::other(e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regen_core::{application::ApplicationError, domain::DomainError};

    #[test]
    fn exit_codes_follow_categories() {
        assert_eq!(CliError::InvalidInput { message: "x".into() }.exit_code(), 2);
        assert_eq!(CliError::SolutionNotFound { path: "/x".into() }.exit_code(), 3);
        assert_eq!(
            CliError::ConfigError {
                message: "x".into(),
                source: None
            }
            .exit_code(),
            4
        );
        assert_eq!(CliError::from(io::Error::other("e")).exit_code(), 1);
    }

    #[test]
    fn manifest_errors_are_configuration_or_not_found() {
        let missing = CliError::Manifest(ManifestError::Read {
            path: "/sln/regen.toml".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        });
        assert_eq!(missing.exit_code(), 3);

        let topology = CliError::Manifest(ManifestError::Domain(DomainError::DuplicateProject(
            "App".into(),
        )));
        assert_eq!(topology.exit_code(), 4);
        assert!(topology.suggestions().iter().any(|s| s.contains("App")));
    }

    #[test]
    fn core_errors_map_through_core_categories() {
        let err = CliError::Core(
            ApplicationError::EntryNotFound {
                path: "/a.tst".into(),
            }
            .into(),
        );
        assert_eq!(err.category(), ErrorCategory::NotFound);

        let render = CliError::Core(
            ApplicationError::RenderingFailed {
                path: "/a.cs".into(),
                reason: "boom".into(),
            }
            .into(),
        );
        assert_eq!(render.exit_code(), 1);
    }

    #[test]
    fn plain_format_has_suggestions_and_hint() {
        let err = CliError::TemplateNotFound {
            path: "/sln/x.tst".into(),
        };
        let s = err.format_plain(false);
        assert!(s.contains("Error:"));
        assert!(s.contains("Suggestions:"));
        assert!(s.contains("--verbose"));
    }

    #[test]
    fn verbose_plain_format_lists_causes() {
        let err = CliError::IoError {
            message: "writing output".into(),
            source: io::Error::other("disk full"),
        };
        let s = err.format_plain(true);
        assert!(s.contains("Caused by: disk full"));
        assert!(!s.contains("--verbose"));
    }

    #[test]
    fn into_cli_io_error() {
        let result: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
        let cli: CliResult<()> = result.with_cli_context(|| "reading solution");
        assert!(matches!(cli, Err(CliError::IoError { ref message, .. }) if message == "reading solution"));
    }
}
