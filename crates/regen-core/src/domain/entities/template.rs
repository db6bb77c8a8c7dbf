//! Template entity.
//!
//! A [`Template`] is identified by the path of its definition file. It owns
//! the compiled representation produced by the
//! [`TemplateCompiler`](crate::application::ports::TemplateCompiler) port and
//! remembers which project the definition belongs to, which is what cache
//! verification checks against.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use crate::domain::{Extension, ProjectEntry, ProjectId};

/// Identity of a template: the path of its definition file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(PathBuf);

impl TemplateId {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Parsed form of a definition file.
///
/// The core treats `body` as opaque; only the render engine interprets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTemplate {
    /// Display name, defaults to the definition file stem.
    pub name: String,
    /// Extension of the generated output files.
    pub output_extension: Extension,
    pub body: String,
}

impl CompiledTemplate {
    pub fn new(name: impl Into<String>, output_extension: Extension, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            output_extension,
            body: body.into(),
        }
    }
}

/// A successfully compiled template bound to its project entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    id: TemplateId,
    project: ProjectId,
    compiled: CompiledTemplate,
}

impl Template {
    pub fn new(entry: ProjectEntry, compiled: CompiledTemplate) -> Self {
        Self {
            id: TemplateId::new(entry.path),
            project: entry.project,
            compiled,
        }
    }

    pub fn id(&self) -> &TemplateId {
        &self.id
    }

    pub fn definition_path(&self) -> &Path {
        self.id.as_path()
    }

    pub fn project(&self) -> &ProjectId {
        &self.project
    }

    pub fn compiled(&self) -> &CompiledTemplate {
        &self.compiled
    }

    pub fn name(&self) -> &str {
        &self.compiled.name
    }

    /// The project entry this template was built from.
    pub fn entry(&self) -> ProjectEntry {
        ProjectEntry::new(self.id.as_path(), self.project.clone())
    }

    /// Where the output generated for `target` lives: next to the target,
    /// same stem, the template's output extension.
    pub fn output_path_for(&self, target: &Path) -> PathBuf {
        target.with_extension(self.compiled.output_extension.bare())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> Template {
        Template::new(
            ProjectEntry::new("/sln/Core/models.tst", ProjectId::from("Core")),
            CompiledTemplate::new("models", Extension::new(".ts").unwrap(), "body"),
        )
    }

    #[test]
    fn identity_is_definition_path() {
        let t = template();
        assert_eq!(t.id(), &TemplateId::new("/sln/Core/models.tst"));
        assert_eq!(t.project().as_str(), "Core");
        assert_eq!(t.entry().path, PathBuf::from("/sln/Core/models.tst"));
    }

    #[test]
    fn output_path_sits_next_to_target() {
        let t = template();
        assert_eq!(
            t.output_path_for(Path::new("/sln/App/User.cs")),
            PathBuf::from("/sln/App/User.ts")
        );
    }
}
