//! Host change notifications.

use std::path::{Path, PathBuf};

use crate::domain::ProjectId;

/// A solution or file lifecycle event delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HostEvent {
    SolutionOpened,
    SolutionClosed,
    ProjectAdded(ProjectId),
    ProjectRemoved(ProjectId),
    FileAdded(PathBuf),
    FileChanged(PathBuf),
    FileDeleted(PathBuf),
    FileRenamed { old: PathBuf, new: PathBuf },
}

impl HostEvent {
    /// File paths carried by the event, old path first for renames.
    pub fn paths(&self) -> Vec<&Path> {
        match self {
            Self::FileAdded(p) | Self::FileChanged(p) | Self::FileDeleted(p) => vec![p.as_path()],
            Self::FileRenamed { old, new } => vec![old.as_path(), new.as_path()],
            _ => Vec::new(),
        }
    }

    /// Whether the event is a solution open/close.
    pub fn is_solution_lifecycle(&self) -> bool {
        matches!(self, Self::SolutionOpened | Self::SolutionClosed)
    }
}

/// Where a notification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventOrigin {
    /// Delivered by the host.
    Host,
    /// Raised by the render pipeline after a failed render.
    RenderFailure,
}

/// A [`HostEvent`] tagged with its origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Notification {
    pub event: HostEvent,
    pub origin: EventOrigin,
}

impl Notification {
    pub fn host(event: HostEvent) -> Self {
        Self {
            event,
            origin: EventOrigin::Host,
        }
    }

    /// The synthetic `FileChanged` raised when rendering `path` failed.
    pub fn render_failure(path: impl Into<PathBuf>) -> Self {
        Self {
            event: HostEvent::FileChanged(path.into()),
            origin: EventOrigin::RenderFailure,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.origin == EventOrigin::RenderFailure
    }
}

impl From<HostEvent> for Notification {
    fn from(event: HostEvent) -> Self {
        Self::host(event)
    }
}
