//! Infrastructure adapters for regen.
//!
//! This crate implements the ports defined in `regen_core::application::ports`.
//! It contains all external dependencies and I/O operations:
//!
//! - [`filesystem`]: `std::fs` and in-memory [`Filesystem`](regen_core::application::Filesystem)s
//! - [`project_model`]: the `regen.toml` solution manifest and `.regen/` bookkeeping
//! - [`template_compiler`]: the `+++`-headed definition-file format
//! - [`metadata`]: regex declaration scanner for target sources
//! - [`renderer`]: placeholder-substitution render engine

pub mod filesystem;
pub mod metadata;
pub mod project_model;
pub mod renderer;
pub mod template_compiler;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use metadata::SourceScanner;
pub use project_model::{MANIFEST_FILE_NAME, ManifestError, ManifestProjectModel};
pub use renderer::SimpleRenderer;
pub use template_compiler::TomlTemplateCompiler;
