//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from the host and from
//! external systems. The `regen-adapters` crate provides implementations.

use std::path::{Path, PathBuf};

use crate::domain::{
    CodeMetadata, CompiledTemplate, Extension, Notification, ProjectEntry, ProjectId, Template,
};
use crate::error::RegenResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `regen_adapters::filesystem::LocalFilesystem` (production)
/// - `regen_adapters::filesystem::MemoryFilesystem` (testing)
pub trait Filesystem: Send + Sync {
    fn read_to_string(&self, path: &Path) -> RegenResult<String>;

    /// Write content to a file, creating parent directories.
    fn write_file(&self, path: &Path, content: &str) -> RegenResult<()>;

    fn remove_file(&self, path: &Path) -> RegenResult<()>;

    fn rename(&self, from: &Path, to: &Path) -> RegenResult<()>;

    fn create_dir_all(&self, path: &Path) -> RegenResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Every file below `root` (recursively) whose extension is `extension`,
    /// sorted by path.
    fn find_files(&self, root: &Path, extension: &Extension) -> RegenResult<Vec<PathBuf>>;
}

/// Port onto the host's project/solution object model.
///
/// Implemented by:
/// - `regen_adapters::project_model::ManifestProjectModel` (solution manifest on disk)
/// - `regen_core::test_utils::FakeSolution` (testing)
pub trait ProjectModel: Send + Sync {
    /// Every project in the solution.
    fn projects(&self) -> Vec<ProjectId>;

    /// On-disk root directory of a project.
    fn project_root(&self, project: &ProjectId) -> RegenResult<PathBuf>;

    /// Every file of a project, recursively.
    fn project_files(&self, project: &ProjectId) -> RegenResult<Vec<ProjectEntry>>;

    /// Projects directly referenced by `project`.
    fn references(&self, project: &ProjectId) -> RegenResult<Vec<ProjectId>>;

    /// Resolve a path to the project entry that owns it.
    fn resolve_entry(&self, path: &Path) -> Option<ProjectEntry>;

    /// Persist bookkeeping for an entry after its template was saved.
    fn persist_entry(&self, entry: &ProjectEntry) -> RegenResult<()>;
}

/// Port for the code-metadata service.
///
/// Implemented by:
/// - `regen_adapters::metadata::SourceScanner` (regex declaration scan)
pub trait MetadataProvider: Send + Sync {
    /// Read the current structure of `path`. Pure read.
    fn file_metadata(&self, path: &Path) -> RegenResult<CodeMetadata>;
}

/// Port for parsing definition files.
///
/// Implemented by:
/// - `regen_adapters::template_compiler::TomlTemplateCompiler`
pub trait TemplateCompiler: Send + Sync {
    fn compile(&self, path: &Path, source: &str) -> RegenResult<CompiledTemplate>;
}

/// Port for the render operation.
///
/// Implemented by:
/// - `regen_adapters::renderer::SimpleRenderer` (placeholder substitution)
pub trait RenderEngine: Send + Sync {
    /// Render `template` for the file described by `metadata`.
    ///
    /// `Ok(false)` reports an expected, non-fatal failure.
    fn render_file(&self, template: &Template, metadata: &CodeMetadata) -> RegenResult<bool>;

    /// Remove the output `template` generated for `target`.
    fn delete_output(&self, template: &Template, target: &Path) -> RegenResult<()>;

    /// Move the output `template` generated for `old` to match `new`.
    fn rename_output(&self, template: &Template, old: &Path, new: &Path) -> RegenResult<()>;
}

/// Port through which the core raises notifications back into its own intake.
pub trait EventSink: Send + Sync {
    fn emit(&self, notification: Notification);
}
