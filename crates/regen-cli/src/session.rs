//! Wiring of a solution to the core services.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use regen_adapters::{
    LocalFilesystem, MANIFEST_FILE_NAME, ManifestProjectModel, SimpleRenderer, SourceScanner,
    TomlTemplateCompiler,
};
use regen_core::prelude::*;
use tracing::{debug, instrument};

use crate::error::{CliError, CliResult};

/// One opened solution: project model, controller, queue and executor over
/// the bundled adapters.
pub struct Session {
    pub model: Arc<ManifestProjectModel>,
    pub queue: Arc<RenderQueue>,
    pub controller: Arc<GenerationController>,
    pub executor: Arc<JobExecutor>,
}

impl Session {
    /// Load the manifest at `solution` and open it. Render failures are
    /// reported through `sink`.
    #[instrument(skip_all, fields(solution = %solution.display()))]
    pub fn open(
        solution: &Path,
        settings: GeneratorSettings,
        sink: Arc<dyn EventSink>,
    ) -> CliResult<Self> {
        let manifest = manifest_path(solution);
        if !manifest.is_file() {
            return Err(CliError::SolutionNotFound { path: manifest });
        }

        let filesystem: Arc<dyn Filesystem> = Arc::new(LocalFilesystem::new());
        let model = Arc::new(ManifestProjectModel::load(&manifest)?);
        let queue = Arc::new(RenderQueue::new());

        let controller = Arc::new(GenerationController::new(
            settings,
            ControllerPorts {
                model: model.clone(),
                filesystem: filesystem.clone(),
                compiler: Arc::new(TomlTemplateCompiler::new()),
            },
            queue.clone(),
        ));
        let executor = Arc::new(JobExecutor::new(
            Arc::new(SourceScanner::new(filesystem.clone())),
            Arc::new(SimpleRenderer::new(filesystem)),
            sink,
        ));

        controller.handle(Notification::host(HostEvent::SolutionOpened));
        debug!(projects = model.projects().len(), "session opened");

        Ok(Self {
            model,
            queue,
            controller,
            executor,
        })
    }

    pub fn root(&self) -> &Path {
        self.model.solution_root()
    }

    /// Run queue passes until the queue is empty. Returns the number of jobs
    /// executed.
    pub fn drain(&self) -> usize {
        let mut executed = 0;
        loop {
            let pass = self.queue.run_pending(&self.executor);
            if pass == 0 {
                break;
            }
            executed += pass;
        }
        executed
    }

    /// Path relative to the solution root, for display.
    pub fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(self.root())
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

/// `solution` itself when it names a file, else `solution/regen.toml`.
pub fn manifest_path(solution: &Path) -> PathBuf {
    if solution.is_dir() {
        solution.join(MANIFEST_FILE_NAME)
    } else {
        solution.to_path_buf()
    }
}
