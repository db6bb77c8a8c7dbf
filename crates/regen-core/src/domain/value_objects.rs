//! Value objects: file extensions, consumer scope, generator settings.

use std::{fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

// ============================================================================
// Extension
// ============================================================================

/// A file extension including its leading dot, stored lowercase.
///
/// Matching is case-insensitive: `Foo.CS` matches `.cs`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Extension(String);

impl Extension {
    /// Parse an extension. A missing leading dot is added.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, DomainError> {
        let raw = raw.as_ref().trim();
        let body = raw.strip_prefix('.').unwrap_or(raw);

        if body.is_empty()
            || body.contains('.')
            || body.contains(['/', '\\'])
            || body.chars().any(char::is_whitespace)
        {
            return Err(DomainError::InvalidExtension(raw.to_string()));
        }

        Ok(Self(format!(".{}", body.to_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The extension without its leading dot (`"tst"`).
    pub fn bare(&self) -> &str {
        &self.0[1..]
    }

    /// Whether `path` ends in this extension.
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(self.bare()))
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Extension {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Extension {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Extension> for String {
    fn from(value: Extension) -> Self {
        value.0
    }
}

// ============================================================================
// ConsumerScope
// ============================================================================

/// Which neighbouring projects consume a definition file's project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsumerScope {
    /// Projects that reference the owning project.
    #[default]
    Dependents,
    /// Projects the owning project references.
    References,
}

impl fmt::Display for ConsumerScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dependents => write!(f, "dependents"),
            Self::References => write!(f, "references"),
        }
    }
}

impl FromStr for ConsumerScope {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dependents" => Ok(Self::Dependents),
            "references" => Ok(Self::References),
            other => Err(DomainError::InvalidConsumerScope(other.to_string())),
        }
    }
}

// ============================================================================
// GeneratorSettings
// ============================================================================

/// Settings consulted by the controller on every notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Extension identifying template definition files.
    pub definition_extension: Extension,
    /// Extension identifying target source files.
    pub target_extension: Extension,
    pub consumer_scope: ConsumerScope,
    /// Render every consumer when a definition file is saved.
    pub render_on_save: bool,
    /// Re-render target files when they are added, changed, deleted or renamed.
    pub track_source_files: bool,
}

impl GeneratorSettings {
    pub const DEFAULT_DEFINITION_EXTENSION: &'static str = ".tst";
    pub const DEFAULT_TARGET_EXTENSION: &'static str = ".cs";

    pub fn is_definition(&self, path: &Path) -> bool {
        self.definition_extension.matches(path)
    }

    pub fn is_target(&self, path: &Path) -> bool {
        self.target_extension.matches(path)
    }
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            definition_extension: Extension(Self::DEFAULT_DEFINITION_EXTENSION.into()),
            target_extension: Extension(Self::DEFAULT_TARGET_EXTENSION.into()),
            consumer_scope: ConsumerScope::default(),
            render_on_save: true,
            track_source_files: true,
        }
    }
}
