//! Dependency resolution: which target files consume a changed file.

use std::{
    collections::{HashMap, hash_map::Entry},
    sync::Arc,
};

use tracing::warn;

use crate::{
    application::ports::ProjectModel,
    domain::{ConsumerScope, Extension, FileRef, ProjectEntry, ProjectGraph, ProjectId, Template},
};

/// Resolves consumers of a file over a fresh project reference graph.
///
/// The consumer projects of an owner are the owner itself plus its direct
/// neighbours in the direction given by [`ConsumerScope`]. There is no
/// further transitivity.
pub struct DependencyResolver {
    model: Arc<dyn ProjectModel>,
    scope: ConsumerScope,
}

impl DependencyResolver {
    pub fn new(model: Arc<dyn ProjectModel>, scope: ConsumerScope) -> Self {
        Self { model, scope }
    }

    pub fn scope(&self) -> ConsumerScope {
        self.scope
    }

    /// Snapshot the solution's reference graph.
    ///
    /// References to projects outside the solution are logged and dropped.
    pub fn project_graph(&self) -> ProjectGraph {
        let mut graph = ProjectGraph::new();
        let projects = self.model.projects();

        for project in &projects {
            graph.add_project(project.clone());
        }
        for project in &projects {
            let references = match self.model.references(project) {
                Ok(references) => references,
                Err(e) => {
                    warn!(project = %project, error = %e, "cannot read project references");
                    continue;
                }
            };
            for referenced in references {
                if let Err(e) = graph.add_reference(project, &referenced) {
                    warn!(error = %e, "ignoring project reference");
                }
            }
        }

        graph
    }

    /// Files consuming `entry`, restricted to `extension`.
    ///
    /// The graph is built once per call; files are produced lazily, one
    /// consumer project at a time. Yields nothing when the owning project is
    /// not part of the solution. Duplicates are not suppressed.
    pub fn resolve_consumers<'a>(
        &'a self,
        entry: &ProjectEntry,
        extension: &'a Extension,
    ) -> impl Iterator<Item = FileRef> + use<'a> {
        let graph = self.project_graph();
        if !graph.contains(&entry.project) {
            warn!(
                path = %entry.path.display(),
                project = %entry.project,
                "owning project is not part of the solution; no consumers"
            );
        }
        let projects = graph.consumer_projects(&entry.project, self.scope);

        projects
            .into_iter()
            .flat_map(move |project| self.files_of(&project, extension))
    }

    /// The subset of `templates` that `file` consumes.
    ///
    /// Each output extension has one owner per consuming project: the first
    /// template in `templates` (the cache keeps them in definition path
    /// order). Later templates with the same output extension would write the
    /// same output file, so they are left out and logged.
    pub fn templates_consumed_by(
        &self,
        file: &ProjectEntry,
        templates: &[Arc<Template>],
    ) -> Vec<Arc<Template>> {
        let graph = self.project_graph();
        let mut owners: HashMap<&Extension, &Arc<Template>> = HashMap::new();
        let mut consumed = Vec::new();

        for template in templates.iter().filter(|t| {
            graph
                .consumer_projects(t.project(), self.scope)
                .contains(&file.project)
        }) {
            match owners.entry(&template.compiled().output_extension) {
                Entry::Occupied(owner) => warn!(
                    template = %template.id(),
                    owner = %owner.get().id(),
                    project = %file.project,
                    extension = %template.compiled().output_extension,
                    "output extension already claimed; skipping template"
                ),
                Entry::Vacant(slot) => {
                    slot.insert(template);
                    consumed.push(template.clone());
                }
            }
        }

        consumed
    }

    /// Whether `template` owns its output for `file` among `templates`.
    pub fn owns_output(
        &self,
        template: &Template,
        file: &ProjectEntry,
        templates: &[Arc<Template>],
    ) -> bool {
        self.templates_consumed_by(file, templates)
            .iter()
            .any(|t| t.id() == template.id())
    }

    fn files_of(&self, project: &ProjectId, extension: &Extension) -> Vec<FileRef> {
        match self.model.project_files(project) {
            Ok(files) => files
                .into_iter()
                .filter(|f| extension.matches(&f.path))
                .collect(),
            Err(e) => {
                warn!(project = %project, error = %e, "cannot list project files");
                Vec::new()
            }
        }
    }
}
