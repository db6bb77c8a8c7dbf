//! Declaration scanner for C#-style sources.
//!
//! Recognises a `namespace` (block or file-scoped) and top-level
//! `class`/`interface`/`enum`/`struct`/`record` declarations. This is a
//! line-oriented scan, not a parser: declarations inside comments that start
//! the line with `//` are ignored, anything cleverer is not.

use std::{path::Path, sync::Arc, sync::LazyLock};

use regex::Regex;
use regen_core::{
    application::{ApplicationError, ports::{Filesystem, MetadataProvider}},
    domain::{CodeMetadata, TypeKind},
    error::RegenResult,
};
use tracing::{instrument, trace};

static NAMESPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*namespace\s+([A-Za-z_][\w.]*)").expect("namespace pattern compiles")
});

static TYPE_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^\s*(?:(?:public|internal|private|protected|static|sealed|abstract|partial|readonly|file|unsafe|new)\s+)*(record(?:\s+(?:class|struct))?|class|interface|enum|struct)\s+([A-Za-z_]\w*)",
    )
    .expect("type declaration pattern compiles")
});

/// [`MetadataProvider`] that reads sources through the [`Filesystem`] port
/// and scans them with regular expressions.
pub struct SourceScanner {
    filesystem: Arc<dyn Filesystem>,
}

impl SourceScanner {
    pub fn new(filesystem: Arc<dyn Filesystem>) -> Self {
        Self { filesystem }
    }

    /// Scan already-loaded source text.
    pub fn scan(path: &Path, source: &str) -> CodeMetadata {
        let mut metadata = CodeMetadata::new(path);

        if let Some(ns) = NAMESPACE.captures(source).and_then(|c| c.get(1)) {
            metadata = metadata.with_namespace(ns.as_str());
        }

        for caps in TYPE_DECL.captures_iter(source) {
            let (Some(keyword), Some(name)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let kind = if keyword.as_str().starts_with("record") {
                TypeKind::Record
            } else {
                match keyword.as_str().parse::<TypeKind>() {
                    Ok(kind) => kind,
                    Err(_) => continue,
                }
            };
            metadata = metadata.with_type(kind, name.as_str());
        }

        trace!(types = metadata.types.len(), "source scanned");
        metadata
    }
}

impl MetadataProvider for SourceScanner {
    #[instrument(skip_all, fields(path = %path.display()))]
    fn file_metadata(&self, path: &Path) -> RegenResult<CodeMetadata> {
        let source = self
            .filesystem
            .read_to_string(path)
            .map_err(|e| ApplicationError::MetadataUnavailable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(Self::scan(path, &source))
    }
}
