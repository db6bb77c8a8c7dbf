//! Render jobs and their coalescing key.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::domain::{DomainError, Template};

/// What a job does with its primary target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JobKind {
    /// Render the target with each template.
    Render,
    /// The target was deleted; remove generated output.
    Delete,
    /// The target was renamed; move generated output. Paths are `[new, old]`.
    Rename,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Render => write!(f, "render"),
            Self::Delete => write!(f, "delete"),
            Self::Rename => write!(f, "rename"),
        }
    }
}

/// Coalescing key: at most one pending job exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobKey {
    pub kind: JobKind,
    pub target: PathBuf,
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.target.display())
    }
}

/// A unit of work for the render queue.
#[derive(Debug, Clone)]
pub struct RenderJob {
    kind: JobKind,
    paths: Vec<PathBuf>,
    templates: Vec<Arc<Template>>,
}

impl RenderJob {
    /// Build a job from raw parts. `paths` must not be empty.
    pub fn new(
        kind: JobKind,
        paths: Vec<PathBuf>,
        templates: Vec<Arc<Template>>,
    ) -> Result<Self, DomainError> {
        if paths.is_empty() {
            return Err(DomainError::EmptyJob {
                kind: kind.to_string(),
            });
        }
        Ok(Self {
            kind,
            paths,
            templates,
        })
    }

    pub fn render(target: impl Into<PathBuf>, templates: Vec<Arc<Template>>) -> Self {
        Self {
            kind: JobKind::Render,
            paths: vec![target.into()],
            templates,
        }
    }

    pub fn delete(target: impl Into<PathBuf>, templates: Vec<Arc<Template>>) -> Self {
        Self {
            kind: JobKind::Delete,
            paths: vec![target.into()],
            templates,
        }
    }

    pub fn rename(
        old: impl Into<PathBuf>,
        new: impl Into<PathBuf>,
        templates: Vec<Arc<Template>>,
    ) -> Self {
        Self {
            kind: JobKind::Rename,
            paths: vec![new.into(), old.into()],
            templates,
        }
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    /// The primary target; its metadata drives rendering.
    pub fn primary(&self) -> &Path {
        &self.paths[0]
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// For rename jobs, the path the target had before the rename.
    pub fn previous_path(&self) -> Option<&Path> {
        match self.kind {
            JobKind::Rename => self.paths.get(1).map(PathBuf::as_path),
            _ => None,
        }
    }

    pub fn templates(&self) -> &[Arc<Template>] {
        &self.templates
    }

    pub fn key(&self) -> JobKey {
        JobKey {
            kind: self.kind,
            target: self.paths[0].clone(),
        }
    }

    /// Fold a later job with the same key into this one.
    ///
    /// The later job's paths win. Templates are unioned by id, a later
    /// template replacing an earlier one with the same id.
    pub fn merge(&mut self, later: RenderJob) {
        debug_assert_eq!(self.key(), later.key());

        self.paths = later.paths;
        for template in later.templates {
            match self.templates.iter_mut().find(|t| t.id() == template.id()) {
                Some(slot) => *slot = template,
                None => self.templates.push(template),
            }
        }
    }
}
