//! Project model backed by a `regen.toml` solution manifest.
//!
//! # `regen.toml` format
//!
//! ```toml
//! [[project]]
//! name       = "App"
//! root       = "src/App"      # relative to the manifest's directory
//! references = ["Core"]       # optional
//!
//! [[project]]
//! name = "Core"
//! root = "src/Core"
//! ```
//!
//! Project roots may nest; a file belongs to the project with the deepest
//! root containing it.

use std::{
    collections::{BTreeMap, HashSet},
    fs, io,
    path::{Component, Path, PathBuf},
    sync::{Mutex, PoisonError, RwLock},
};

use chrono::Utc;
use regen_core::{
    application::{ApplicationError, ports::ProjectModel},
    domain::{DomainError, ProjectEntry, ProjectId},
    error::{RegenError, RegenResult},
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::{filesystem::walk_files, project_model::state::SolutionState};

/// File name looked up when a directory is given as the solution.
pub const MANIFEST_FILE_NAME: &str = "regen.toml";

/// Errors raised while loading a solution manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("cannot read solution manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid solution manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<ManifestError> for RegenError {
    fn from(e: ManifestError) -> Self {
        match e {
            ManifestError::Domain(d) => RegenError::Domain(d),
            other => RegenError::Configuration {
                message: other.to_string(),
            },
        }
    }
}

// ── Manifest types ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ManifestFile {
    #[serde(default, rename = "project")]
    projects: Vec<ProjectSection>,
}

/// One `[[project]]` entry.
#[derive(Debug, Clone, Deserialize)]
struct ProjectSection {
    name: String,
    root: PathBuf,
    #[serde(default)]
    references: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ProjectInfo {
    root: PathBuf,
    references: Vec<ProjectId>,
}

type Projects = BTreeMap<ProjectId, ProjectInfo>;

/// Projects that appeared or disappeared on [`ManifestProjectModel::reload`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TopologyChange {
    pub added: Vec<ProjectId>,
    pub removed: Vec<ProjectId>,
    /// Projects whose root or references changed.
    pub changed: Vec<ProjectId>,
}

impl TopologyChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

// ── Model ─────────────────────────────────────────────────────────────────────

/// [`ProjectModel`] over a `regen.toml` manifest on disk.
pub struct ManifestProjectModel {
    manifest_path: PathBuf,
    solution_root: PathBuf,
    projects: RwLock<Projects>,
    state_path: PathBuf,
    state: Mutex<SolutionState>,
}

impl ManifestProjectModel {
    /// Load a solution from a manifest file or a directory containing
    /// `regen.toml`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let manifest_path = if path.is_dir() {
            path.join(MANIFEST_FILE_NAME)
        } else {
            path.to_path_buf()
        };
        let manifest_path = absolute(&manifest_path);
        let solution_root = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let projects = read_projects(&manifest_path, &solution_root)?;
        let state_path = SolutionState::path_for(&solution_root);
        let state = SolutionState::load(&state_path);

        info!(projects = projects.len(), root = %solution_root.display(), "solution loaded");
        Ok(Self {
            manifest_path,
            solution_root,
            projects: RwLock::new(projects),
            state_path,
            state: Mutex::new(state),
        })
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    pub fn solution_root(&self) -> &Path {
        &self.solution_root
    }

    /// Snapshot of the persisted bookkeeping.
    pub fn state(&self) -> SolutionState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Re-read the manifest and report what changed.
    ///
    /// On error the previous topology stays in place.
    pub fn reload(&self) -> Result<TopologyChange, ManifestError> {
        let fresh = read_projects(&self.manifest_path, &self.solution_root)?;
        let mut projects = self.projects.write().unwrap_or_else(PoisonError::into_inner);

        let mut change = TopologyChange::default();
        for (id, info) in &fresh {
            match projects.get(id) {
                None => change.added.push(id.clone()),
                Some(old) if old != info => change.changed.push(id.clone()),
                Some(_) => {}
            }
        }
        change.removed = projects
            .keys()
            .filter(|id| !fresh.contains_key(*id))
            .cloned()
            .collect();

        *projects = fresh;
        debug!(?change, "solution manifest reloaded");
        Ok(change)
    }

    fn read_projects(&self) -> std::sync::RwLockReadGuard<'_, Projects> {
        self.projects.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_key(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.solution_root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl ProjectModel for ManifestProjectModel {
    fn projects(&self) -> Vec<ProjectId> {
        self.read_projects().keys().cloned().collect()
    }

    fn project_root(&self, project: &ProjectId) -> RegenResult<PathBuf> {
        match self.read_projects().get(project) {
            Some(info) if info.root.is_dir() => Ok(info.root.clone()),
            _ => Err(ApplicationError::ProjectRootUnknown {
                project: project.to_string(),
            }
            .into()),
        }
    }

    fn project_files(&self, project: &ProjectId) -> RegenResult<Vec<ProjectEntry>> {
        let root = self.project_root(project)?;
        let projects = self.read_projects();
        let mut files: Vec<ProjectEntry> = walk_files(&root)
            .filter(|path| owner_of(&projects, path).as_ref() == Some(project))
            .map(|path| ProjectEntry::new(path, project.clone()))
            .collect();
        files.sort();
        Ok(files)
    }

    fn references(&self, project: &ProjectId) -> RegenResult<Vec<ProjectId>> {
        self.read_projects()
            .get(project)
            .map(|info| info.references.clone())
            .ok_or_else(|| DomainError::UnknownProject(project.to_string()).into())
    }

    fn resolve_entry(&self, path: &Path) -> Option<ProjectEntry> {
        let path = absolute(path);
        let project = owner_of(&self.read_projects(), &path)?;
        Some(ProjectEntry::new(path, project))
    }

    fn persist_entry(&self, entry: &ProjectEntry) -> RegenResult<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.record_save(self.state_key(&entry.path), entry.project.as_str(), Utc::now());
        state
            .save(&self.state_path)
            .map_err(|e| ApplicationError::PersistFailed {
                path: self.state_path.clone(),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn read_projects(manifest_path: &Path, solution_root: &Path) -> Result<Projects, ManifestError> {
    let raw = fs::read_to_string(manifest_path).map_err(|source| ManifestError::Read {
        path: manifest_path.to_path_buf(),
        source,
    })?;
    let manifest: ManifestFile = toml::from_str(&raw).map_err(|source| ManifestError::Parse {
        path: manifest_path.to_path_buf(),
        source,
    })?;
    build_projects(manifest.projects, solution_root)
}

fn build_projects(
    sections: Vec<ProjectSection>,
    solution_root: &Path,
) -> Result<Projects, ManifestError> {
    let names: HashSet<&str> = sections.iter().map(|s| s.name.as_str()).collect();
    let mut projects = Projects::new();

    for section in &sections {
        let name = section.name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidManifest("project name is empty".into()).into());
        }
        for reference in &section.references {
            if !names.contains(reference.as_str()) {
                return Err(DomainError::UnknownReference {
                    from: name.to_string(),
                    to: reference.clone(),
                }
                .into());
            }
        }

        let info = ProjectInfo {
            root: normalize(&solution_root.join(&section.root)),
            references: section.references.iter().map(|r| ProjectId::from(r.as_str())).collect(),
        };
        if projects.insert(ProjectId::from(name), info).is_some() {
            return Err(DomainError::DuplicateProject(name.to_string()).into());
        }
    }

    Ok(projects)
}

/// The project with the deepest root containing `path`.
fn owner_of(projects: &Projects, path: &Path) -> Option<ProjectId> {
    projects
        .iter()
        .filter(|(_, info)| path.starts_with(&info.root))
        .max_by_key(|(_, info)| info.root.components().count())
        .map(|(id, _)| id.clone())
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        match std::env::current_dir() {
            Ok(cwd) => normalize(&cwd.join(path)),
            Err(_) => normalize(path),
        }
    }
}

/// Lexically resolve `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
