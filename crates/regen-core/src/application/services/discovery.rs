//! Template discovery: find definition files under every project root.

use std::sync::Arc;

use tracing::{debug, error, instrument};

use crate::{
    application::ports::{Filesystem, ProjectModel},
    domain::{Extension, ProjectEntry},
};

/// Scans project roots for definition files and resolves them back to
/// project entries.
pub struct TemplateDiscovery {
    model: Arc<dyn ProjectModel>,
    filesystem: Arc<dyn Filesystem>,
}

impl TemplateDiscovery {
    pub fn new(model: Arc<dyn ProjectModel>, filesystem: Arc<dyn Filesystem>) -> Self {
        Self { model, filesystem }
    }

    /// Every definition file in the solution, as resolved project entries.
    ///
    /// Projects whose root cannot be determined or walked are skipped with an
    /// error log. Paths that do not resolve to a project entry are dropped.
    /// The result is sorted and free of duplicates (nested roots can report
    /// the same file twice).
    #[instrument(skip_all, fields(extension = %extension))]
    pub fn discover(&self, extension: &Extension) -> Vec<ProjectEntry> {
        let mut found = Vec::new();

        for project in self.model.projects() {
            let root = match self.model.project_root(&project) {
                Ok(root) => root,
                Err(e) => {
                    error!(project = %project, error = %e, "skipping project: root unknown");
                    continue;
                }
            };

            let paths = match self.filesystem.find_files(&root, extension) {
                Ok(paths) => paths,
                Err(e) => {
                    error!(
                        project = %project,
                        root = %root.display(),
                        error = %e,
                        "skipping project: root could not be scanned"
                    );
                    continue;
                }
            };

            for path in paths {
                match self.model.resolve_entry(&path) {
                    Some(entry) => found.push(entry),
                    None => debug!(path = %path.display(), "discarding unresolvable definition"),
                }
            }
        }

        found.sort();
        found.dedup();
        debug!(count = found.len(), "definition files discovered");
        found
    }
}
