//! Generation controller.
//!
//! Turns host notifications into cache invalidations and render jobs.
//! Classification is a pure table, [`commands_for`]; the controller applies
//! the resulting [`Command`]s against the cache, resolver and queue.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tracing::{debug, error, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, ProjectModel, TemplateCompiler},
        services::{DependencyResolver, RenderQueue, TemplateCache},
    },
    domain::{GeneratorSettings, HostEvent, Notification, RenderJob},
    error::RegenResult,
};

/// What a notification asks the controller to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Solution opened or closed.
    SetSolutionOpen(bool),
    /// Drop the template cache.
    InvalidateTemplates,
    /// A definition file was saved; re-render its consumers.
    RenderTemplate(PathBuf),
    /// A target file was added or changed.
    RenderSource(PathBuf),
    /// A target file was deleted.
    DeleteSource(PathBuf),
    /// A target file was renamed.
    RenameSource { old: PathBuf, new: PathBuf },
}

/// Map a host event to the commands it triggers.
///
/// Pure: no I/O and no controller state. A rename is classified path by
/// path, and the result never invalidates the cache more than once.
pub fn commands_for(event: &HostEvent, settings: &GeneratorSettings) -> Vec<Command> {
    let mut commands = Vec::new();
    let mut push = |command: Command| {
        if !commands.contains(&command) {
            commands.push(command);
        }
    };
    let track = settings.track_source_files;

    match event {
        HostEvent::SolutionOpened => {
            push(Command::SetSolutionOpen(true));
            push(Command::InvalidateTemplates);
        }
        HostEvent::SolutionClosed => push(Command::SetSolutionOpen(false)),
        HostEvent::ProjectAdded(_) | HostEvent::ProjectRemoved(_) => {
            push(Command::InvalidateTemplates)
        }
        HostEvent::FileAdded(path) => {
            if settings.is_definition(path) {
                push(Command::InvalidateTemplates);
            } else if track && settings.is_target(path) {
                push(Command::RenderSource(path.clone()));
            }
        }
        HostEvent::FileChanged(path) => {
            if settings.is_definition(path) {
                push(Command::InvalidateTemplates);
                if settings.render_on_save {
                    push(Command::RenderTemplate(path.clone()));
                }
            } else if track && settings.is_target(path) {
                push(Command::RenderSource(path.clone()));
            }
        }
        HostEvent::FileDeleted(path) => {
            if settings.is_definition(path) {
                push(Command::InvalidateTemplates);
            } else if track && settings.is_target(path) {
                push(Command::DeleteSource(path.clone()));
            }
        }
        HostEvent::FileRenamed { old, new } => {
            if settings.is_definition(old) || settings.is_definition(new) {
                push(Command::InvalidateTemplates);
            }
            if track {
                match (settings.is_target(old), settings.is_target(new)) {
                    (true, true) => push(Command::RenameSource {
                        old: old.clone(),
                        new: new.clone(),
                    }),
                    (true, false) => push(Command::DeleteSource(old.clone())),
                    (false, true) => push(Command::RenderSource(new.clone())),
                    (false, false) => {}
                }
            }
        }
    }

    commands
}

/// The driven ports the controller needs to build its collaborators.
pub struct ControllerPorts {
    pub model: Arc<dyn ProjectModel>,
    pub filesystem: Arc<dyn Filesystem>,
    pub compiler: Arc<dyn TemplateCompiler>,
}

#[derive(Debug, Default)]
struct ControllerState {
    open: bool,
    /// Targets whose render failed, replayed on the next host event.
    deferred: BTreeSet<PathBuf>,
}

/// Entry point for every notification.
pub struct GenerationController {
    settings: GeneratorSettings,
    model: Arc<dyn ProjectModel>,
    cache: TemplateCache,
    resolver: DependencyResolver,
    queue: Arc<RenderQueue>,
    state: Mutex<ControllerState>,
}

impl GenerationController {
    pub fn new(settings: GeneratorSettings, ports: ControllerPorts, queue: Arc<RenderQueue>) -> Self {
        let cache = TemplateCache::new(
            ports.model.clone(),
            ports.filesystem,
            ports.compiler,
            settings.definition_extension.clone(),
            settings.target_extension.clone(),
        );
        let resolver = DependencyResolver::new(ports.model.clone(), settings.consumer_scope);

        Self {
            settings,
            model: ports.model,
            cache,
            resolver,
            queue,
            state: Mutex::new(ControllerState::default()),
        }
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    pub fn cache(&self) -> &TemplateCache {
        &self.cache
    }

    pub fn queue(&self) -> &Arc<RenderQueue> {
        &self.queue
    }

    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    /// Targets parked after a failed render.
    pub fn deferred(&self) -> Vec<PathBuf> {
        self.lock().deferred.iter().cloned().collect()
    }

    /// Handle one notification. Never fails; errors are logged.
    ///
    /// Calls are serialized. While the solution is closed only open/close
    /// has any effect. Synthetic render-failure notifications are parked
    /// and replayed after the next host event, so a failing render is
    /// retried at the pace of real changes rather than in a tight loop.
    #[instrument(skip_all, fields(event = ?notification.event, origin = ?notification.origin))]
    pub fn handle(&self, notification: Notification) {
        let mut state = self.lock();

        if !state.open && !notification.event.is_solution_lifecycle() {
            debug!("solution closed; ignoring notification");
            return;
        }

        if notification.is_synthetic() {
            if let HostEvent::FileChanged(path) = notification.event {
                debug!(path = %path.display(), "parking failed render until next host event");
                state.deferred.insert(path);
            }
            return;
        }

        for command in commands_for(&notification.event, &self.settings) {
            self.apply(&mut state, command);
        }

        if state.open && !state.deferred.is_empty() {
            let replay = std::mem::take(&mut state.deferred);
            debug!(count = replay.len(), "replaying failed renders");
            for path in replay {
                self.render_source(&path);
            }
        }
    }

    /// Re-render every consumer of the definition file at `path`.
    ///
    /// Returns the number of jobs enqueued. Errors are logged and swallowed.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn template_saved(&self, path: &Path) -> usize {
        match self.try_template_saved(path) {
            Ok(enqueued) => enqueued,
            Err(e) => {
                error!(error = %e, "save handling failed");
                0
            }
        }
    }

    /// [`template_saved`](Self::template_saved) for every cached template.
    pub fn render_all(&self) -> RegenResult<usize> {
        let templates = self.cache.templates()?;
        Ok(templates
            .iter()
            .map(|t| self.template_saved(t.definition_path()))
            .sum())
    }

    fn try_template_saved(&self, path: &Path) -> RegenResult<usize> {
        let entry = self
            .model
            .resolve_entry(path)
            .ok_or_else(|| ApplicationError::EntryNotFound {
                path: path.to_path_buf(),
            })?;
        let template = Arc::new(self.cache.construct(&entry)?);

        let mut templates = self.cache.templates()?;
        match templates.iter().position(|t| t.id() == template.id()) {
            Some(i) => templates[i] = template.clone(),
            None => {
                templates.push(template.clone());
                templates.sort_by(|a, b| a.definition_path().cmp(b.definition_path()));
            }
        }

        let mut owned = BTreeMap::new();
        let mut enqueued = 0;
        for consumer in self
            .resolver
            .resolve_consumers(&entry, &self.settings.target_extension)
        {
            let owns = *owned.entry(consumer.project.clone()).or_insert_with(|| {
                self.resolver.owns_output(&template, &consumer, &templates)
            });
            if !owns {
                continue;
            }
            self.queue
                .enqueue(RenderJob::render(consumer.path, vec![template.clone()]));
            enqueued += 1;
        }

        self.model.persist_entry(&entry)?;
        info!(template = %template.id(), enqueued, "template saved");
        Ok(enqueued)
    }

    fn apply(&self, state: &mut ControllerState, command: Command) {
        debug!(command = ?command, "applying");
        match command {
            Command::SetSolutionOpen(open) => {
                state.open = open;
                if !open {
                    state.deferred.clear();
                }
            }
            Command::InvalidateTemplates => self.cache.invalidate(),
            Command::RenderTemplate(path) => {
                self.template_saved(&path);
            }
            Command::RenderSource(path) => self.render_source(&path),
            Command::DeleteSource(path) => self.delete_source(&path),
            Command::RenameSource { old, new } => self.rename_source(&old, &new),
        }
    }

    fn render_source(&self, path: &Path) {
        let Some(entry) = self.model.resolve_entry(path) else {
            debug!(path = %path.display(), "target is not part of any project");
            return;
        };
        let templates = match self.cache.templates() {
            Ok(templates) => templates,
            Err(e) => {
                error!(error = %e, "template cache unavailable");
                return;
            }
        };

        let applicable = self.resolver.templates_consumed_by(&entry, &templates);
        if applicable.is_empty() {
            debug!(path = %path.display(), "no template consumes this file");
            return;
        }
        self.queue.enqueue(RenderJob::render(path, applicable));
    }

    /// Entries resolve by location, so a deleted target still maps to its
    /// project. If it does not, every template's output is removed.
    fn delete_source(&self, path: &Path) {
        let templates = match self.cache.templates() {
            Ok(templates) => templates,
            Err(e) => {
                error!(error = %e, "template cache unavailable");
                return;
            }
        };
        let applicable = match self.model.resolve_entry(path) {
            Some(entry) => self.resolver.templates_consumed_by(&entry, &templates),
            None => templates,
        };
        if !applicable.is_empty() {
            self.queue.enqueue(RenderJob::delete(path, applicable));
        }
    }

    fn rename_source(&self, old: &Path, new: &Path) {
        let Some(entry) = self.model.resolve_entry(new) else {
            warn!(path = %new.display(), "renamed target left every project");
            self.delete_source(old);
            return;
        };
        match self.cache.templates() {
            Ok(templates) => {
                let applicable = self.resolver.templates_consumed_by(&entry, &templates);
                if !applicable.is_empty() {
                    self.queue.enqueue(RenderJob::rename(old, new, applicable));
                }
            }
            Err(e) => error!(error = %e, "template cache unavailable"),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
