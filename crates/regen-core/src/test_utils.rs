//! In-memory port fakes for tests.
//!
//! Available to unit tests and, with the `test-utils` feature, to integration
//! tests and downstream crates.

use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

use crate::{
    application::{
        ApplicationError,
        ports::{
            EventSink, Filesystem, MetadataProvider, ProjectModel, RenderEngine, TemplateCompiler,
        },
        services::{ControllerPorts, GenerationController, JobExecutor, RenderQueue},
    },
    domain::{
        CodeMetadata, CompiledTemplate, DomainError, Extension, GeneratorSettings, HostEvent,
        Notification, ProjectEntry, ProjectId, Template, TemplateId,
    },
    error::RegenResult,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone)]
struct FakeProject {
    root: PathBuf,
    references: Vec<ProjectId>,
}

#[derive(Debug, Default)]
struct SolutionState {
    projects: BTreeMap<ProjectId, FakeProject>,
    broken_roots: HashSet<ProjectId>,
    files: BTreeMap<PathBuf, String>,
    persisted: Vec<ProjectEntry>,
}

impl SolutionState {
    /// The project with the deepest root containing `path`.
    fn owner_of(&self, path: &Path) -> Option<ProjectId> {
        self.projects
            .iter()
            .filter(|(_, p)| path.starts_with(&p.root))
            .max_by_key(|(_, p)| p.root.components().count())
            .map(|(id, _)| id.clone())
    }
}

/// An in-memory solution: project model and filesystem in one.
#[derive(Debug, Clone, Default)]
pub struct FakeSolution {
    state: Arc<Mutex<SolutionState>>,
}

impl FakeSolution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(self, name: &str, root: impl Into<PathBuf>, references: &[&str]) -> Self {
        self.add_project(name, root, references);
        self
    }

    pub fn file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.write(path, content);
        self
    }

    pub fn add_project(&self, name: &str, root: impl Into<PathBuf>, references: &[&str]) {
        lock(&self.state).projects.insert(
            ProjectId::from(name),
            FakeProject {
                root: root.into(),
                references: references.iter().map(|r| ProjectId::from(*r)).collect(),
            },
        );
    }

    pub fn remove_project(&self, name: &str) {
        lock(&self.state).projects.remove(&ProjectId::from(name));
    }

    /// Make `project_root` fail for `name`.
    pub fn break_root(&self, name: &str) {
        lock(&self.state).broken_roots.insert(ProjectId::from(name));
    }

    pub fn write(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        lock(&self.state).files.insert(path.into(), content.into());
    }

    pub fn remove(&self, path: &Path) {
        lock(&self.state).files.remove(path);
    }

    pub fn contents(&self, path: &Path) -> Option<String> {
        lock(&self.state).files.get(path).cloned()
    }

    /// Entries passed to `persist_entry`, in call order.
    pub fn persisted(&self) -> Vec<ProjectEntry> {
        lock(&self.state).persisted.clone()
    }

    pub fn model(&self) -> Arc<dyn ProjectModel> {
        Arc::new(self.clone())
    }

    pub fn filesystem(&self) -> Arc<dyn Filesystem> {
        Arc::new(self.clone())
    }
}

impl ProjectModel for FakeSolution {
    fn projects(&self) -> Vec<ProjectId> {
        lock(&self.state).projects.keys().cloned().collect()
    }

    fn project_root(&self, project: &ProjectId) -> RegenResult<PathBuf> {
        let state = lock(&self.state);
        match state.projects.get(project) {
            Some(p) if !state.broken_roots.contains(project) => Ok(p.root.clone()),
            _ => Err(ApplicationError::ProjectRootUnknown {
                project: project.to_string(),
            }
            .into()),
        }
    }

    fn project_files(&self, project: &ProjectId) -> RegenResult<Vec<ProjectEntry>> {
        let state = lock(&self.state);
        Ok(state
            .files
            .keys()
            .filter(|path| state.owner_of(path).as_ref() == Some(project))
            .map(|path| ProjectEntry::new(path.clone(), project.clone()))
            .collect())
    }

    fn references(&self, project: &ProjectId) -> RegenResult<Vec<ProjectId>> {
        lock(&self.state)
            .projects
            .get(project)
            .map(|p| p.references.clone())
            .ok_or_else(|| DomainError::UnknownProject(project.to_string()).into())
    }

    fn resolve_entry(&self, path: &Path) -> Option<ProjectEntry> {
        lock(&self.state)
            .owner_of(path)
            .map(|project| ProjectEntry::new(path, project))
    }

    fn persist_entry(&self, entry: &ProjectEntry) -> RegenResult<()> {
        lock(&self.state).persisted.push(entry.clone());
        Ok(())
    }
}

impl Filesystem for FakeSolution {
    fn read_to_string(&self, path: &Path) -> RegenResult<String> {
        self.contents(path).ok_or_else(|| {
            ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "not found".into(),
            }
            .into()
        })
    }

    fn write_file(&self, path: &Path, content: &str) -> RegenResult<()> {
        self.write(path, content);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> RegenResult<()> {
        match lock(&self.state).files.remove(path) {
            Some(_) => Ok(()),
            None => Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "not found".into(),
            }
            .into()),
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> RegenResult<()> {
        let mut state = lock(&self.state);
        let content = state
            .files
            .remove(from)
            .ok_or_else(|| ApplicationError::FilesystemError {
                path: from.to_path_buf(),
                reason: "not found".into(),
            })?;
        state.files.insert(to.to_path_buf(), content);
        Ok(())
    }

    fn create_dir_all(&self, _path: &Path) -> RegenResult<()> {
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        lock(&self.state).files.contains_key(path)
    }

    fn find_files(&self, root: &Path, extension: &Extension) -> RegenResult<Vec<PathBuf>> {
        Ok(lock(&self.state)
            .files
            .keys()
            .filter(|p| p.starts_with(root) && extension.matches(p))
            .cloned()
            .collect())
    }
}

/// Compiles any source into a template named after the file stem. The
/// output extension is the stem too, unless the first line reads
/// `output=<extension>`. Sources containing [`FakeCompiler::INVALID_MARKER`]
/// fail to compile.
#[derive(Debug, Default)]
pub struct FakeCompiler {
    compiled: AtomicUsize,
}

impl FakeCompiler {
    pub const INVALID_MARKER: &'static str = "!invalid";
    pub const OUTPUT_PREFIX: &'static str = "output=";

    pub fn compile_count(&self) -> usize {
        self.compiled.load(Ordering::Relaxed)
    }
}

impl TemplateCompiler for FakeCompiler {
    fn compile(&self, path: &Path, source: &str) -> RegenResult<CompiledTemplate> {
        self.compiled.fetch_add(1, Ordering::Relaxed);
        if source.contains(Self::INVALID_MARKER) {
            return Err(DomainError::invalid_template(path.display().to_string(), "marked invalid").into());
        }
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = match source.lines().next().and_then(|l| l.strip_prefix(Self::OUTPUT_PREFIX)) {
            Some(declared) => Extension::new(declared)?,
            None => Extension::new(&name)?,
        };
        Ok(CompiledTemplate::new(name, extension, source))
    }
}

/// Returns bare metadata for any path and counts lookups.
#[derive(Debug, Default)]
pub struct FakeMetadata {
    lookups: AtomicUsize,
}

impl FakeMetadata {
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

impl MetadataProvider for FakeMetadata {
    fn file_metadata(&self, path: &Path) -> RegenResult<CodeMetadata> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        Ok(CodeMetadata::new(path))
    }
}

/// Records every engine call. Targets marked with [`fail_on`] report
/// `Ok(false)`; targets marked with [`panic_once_on`] panic on their next
/// render.
///
/// [`fail_on`]: RecordingEngine::fail_on
/// [`panic_once_on`]: RecordingEngine::panic_once_on
#[derive(Debug, Default)]
pub struct RecordingEngine {
    renders: Mutex<Vec<(TemplateId, PathBuf)>>,
    deletes: Mutex<Vec<(TemplateId, PathBuf)>>,
    renames: Mutex<Vec<(TemplateId, PathBuf, PathBuf)>>,
    failing: Mutex<BTreeSet<PathBuf>>,
    panicking: Mutex<BTreeSet<PathBuf>>,
}

impl RecordingEngine {
    pub fn fail_on(&self, target: impl Into<PathBuf>) {
        lock(&self.failing).insert(target.into());
    }

    pub fn panic_once_on(&self, target: impl Into<PathBuf>) {
        lock(&self.panicking).insert(target.into());
    }

    pub fn succeed_on(&self, target: &Path) {
        lock(&self.failing).remove(target);
    }

    /// Successful and failed render attempts, in call order.
    pub fn renders(&self) -> Vec<(TemplateId, PathBuf)> {
        lock(&self.renders).clone()
    }

    pub fn rendered_targets(&self) -> BTreeSet<PathBuf> {
        lock(&self.renders).iter().map(|(_, p)| p.clone()).collect()
    }

    pub fn deletes(&self) -> Vec<(TemplateId, PathBuf)> {
        lock(&self.deletes).clone()
    }

    pub fn renames(&self) -> Vec<(TemplateId, PathBuf, PathBuf)> {
        lock(&self.renames).clone()
    }

    pub fn clear(&self) {
        lock(&self.renders).clear();
        lock(&self.deletes).clear();
        lock(&self.renames).clear();
    }
}

impl RenderEngine for RecordingEngine {
    fn render_file(&self, template: &Template, metadata: &CodeMetadata) -> RegenResult<bool> {
        if lock(&self.panicking).remove(metadata.path()) {
            panic!("render engine blew up on {}", metadata.path().display());
        }
        lock(&self.renders).push((template.id().clone(), metadata.path().to_path_buf()));
        Ok(!lock(&self.failing).contains(metadata.path()))
    }

    fn delete_output(&self, template: &Template, target: &Path) -> RegenResult<()> {
        lock(&self.deletes).push((template.id().clone(), target.to_path_buf()));
        Ok(())
    }

    fn rename_output(&self, template: &Template, old: &Path, new: &Path) -> RegenResult<()> {
        lock(&self.renames).push((template.id().clone(), old.to_path_buf(), new.to_path_buf()));
        Ok(())
    }
}

/// Collects emitted notifications.
#[derive(Debug, Default)]
pub struct RecordingSink {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn notifications(&self) -> Vec<Notification> {
        lock(&self.notifications).clone()
    }

    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *lock(&self.notifications))
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, notification: Notification) {
        lock(&self.notifications).push(notification);
    }
}

/// An executor over [`FakeMetadata`] and the given engine and sink.
pub fn executor_with(engine: Arc<RecordingEngine>, sink: Arc<RecordingSink>) -> JobExecutor {
    JobExecutor::new(Arc::new(FakeMetadata::default()), engine, sink)
}

/// A fully wired controller, queue and executor over a [`FakeSolution`].
///
/// Runs synchronously: nothing is rendered until [`run`](Harness::run), and
/// failure notifications stay in the sink until
/// [`deliver_feedback`](Harness::deliver_feedback).
pub struct Harness {
    pub solution: FakeSolution,
    pub compiler: Arc<FakeCompiler>,
    pub metadata: Arc<FakeMetadata>,
    pub engine: Arc<RecordingEngine>,
    pub sink: Arc<RecordingSink>,
    pub queue: Arc<RenderQueue>,
    pub controller: GenerationController,
    pub executor: JobExecutor,
}

impl Harness {
    pub fn new(solution: FakeSolution) -> Self {
        Self::with_settings(solution, GeneratorSettings::default())
    }

    pub fn with_settings(solution: FakeSolution, settings: GeneratorSettings) -> Self {
        let compiler = Arc::new(FakeCompiler::default());
        let metadata = Arc::new(FakeMetadata::default());
        let engine = Arc::new(RecordingEngine::default());
        let sink = Arc::new(RecordingSink::default());
        let queue = Arc::new(RenderQueue::new());

        let controller = GenerationController::new(
            settings,
            ControllerPorts {
                model: solution.model(),
                filesystem: solution.filesystem(),
                compiler: compiler.clone(),
            },
            queue.clone(),
        );
        let executor = JobExecutor::new(metadata.clone(), engine.clone(), sink.clone());

        Self {
            solution,
            compiler,
            metadata,
            engine,
            sink,
            queue,
            controller,
            executor,
        }
    }

    pub fn send(&self, event: HostEvent) {
        self.controller.handle(Notification::host(event));
    }

    pub fn open(&self) {
        self.send(HostEvent::SolutionOpened);
    }

    /// Run one queue pass.
    pub fn run(&self) -> usize {
        self.queue.run_pending(&self.executor)
    }

    /// Hand every emitted notification back to the controller.
    pub fn deliver_feedback(&self) -> usize {
        let pending = self.sink.take();
        let count = pending.len();
        for notification in pending {
            self.controller.handle(notification);
        }
        count
    }
}
