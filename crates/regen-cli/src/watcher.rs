//! Polling change source for `regen watch`.
//!
//! Snapshots every file under the solution root (modification times) at a
//! fixed interval and turns the difference into host events. Renames show up
//! as a delete plus an add. A change to the manifest reloads the project
//! model and reports added and removed projects.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, SystemTime},
};

use regen_adapters::{ManifestProjectModel, filesystem::walk_files};
use regen_core::domain::{HostEvent, Notification};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

/// File path to last modification time.
pub type Snapshot = BTreeMap<PathBuf, SystemTime>;

pub fn snapshot(root: &Path) -> Snapshot {
    walk_files(root)
        .filter_map(|path| {
            let modified = path.metadata().and_then(|m| m.modified()).ok()?;
            Some((path, modified))
        })
        .collect()
}

/// Events turning `old` into `new`: deletions, then additions, then changes,
/// each in path order.
pub fn diff(old: &Snapshot, new: &Snapshot) -> Vec<HostEvent> {
    let deleted = old
        .keys()
        .filter(|p| !new.contains_key(*p))
        .map(|p| HostEvent::FileDeleted(p.clone()));
    let added = new
        .keys()
        .filter(|p| !old.contains_key(*p))
        .map(|p| HostEvent::FileAdded(p.clone()));
    let changed = new
        .iter()
        .filter(|(p, modified)| old.get(*p).is_some_and(|before| before != *modified))
        .map(|(p, _)| HostEvent::FileChanged(p.clone()));

    deleted.chain(added).chain(changed).collect()
}

pub struct PollingWatcher {
    root: PathBuf,
    interval: Duration,
    model: Arc<ManifestProjectModel>,
    sender: UnboundedSender<Notification>,
    last: Snapshot,
}

impl PollingWatcher {
    /// Takes the baseline snapshot immediately.
    pub fn new(
        model: Arc<ManifestProjectModel>,
        interval: Duration,
        sender: UnboundedSender<Notification>,
    ) -> Self {
        let root = model.solution_root().to_path_buf();
        let last = snapshot(&root);
        debug!(root = %root.display(), files = last.len(), "watch baseline taken");
        Self {
            root,
            interval,
            model,
            sender,
            last,
        }
    }

    /// Poll until cancelled or the intake goes away.
    pub async fn run(mut self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }

            let root = self.root.clone();
            let current = match tokio::task::spawn_blocking(move || snapshot(&root)).await {
                Ok(current) => current,
                Err(e) => {
                    error!(error = %e, "snapshot task failed");
                    continue;
                }
            };

            if !self.publish(current) {
                debug!("intake closed; watcher stopping");
                break;
            }
        }
    }

    /// Diff against the previous snapshot and send the resulting events.
    /// Returns `false` once the intake is gone.
    fn publish(&mut self, current: Snapshot) -> bool {
        let mut events = diff(&self.last, &current);
        self.last = current;
        if events.is_empty() {
            return true;
        }

        if events.iter().any(|e| e.paths().contains(&self.model.manifest_path())) {
            let mut topology = self.topology_events();
            topology.append(&mut events);
            events = topology;
        }

        trace!(count = events.len(), "publishing changes");
        events
            .into_iter()
            .all(|event| self.sender.send(Notification::host(event)).is_ok())
    }

    fn topology_events(&self) -> Vec<HostEvent> {
        match self.model.reload() {
            Ok(change) => change
                .removed
                .into_iter()
                .map(HostEvent::ProjectRemoved)
                .chain(
                    change
                        .added
                        .into_iter()
                        .chain(change.changed)
                        .map(HostEvent::ProjectAdded),
                )
                .collect(),
            Err(e) => {
                warn!(error = %e, "solution manifest unreadable; keeping previous projects");
                Vec::new()
            }
        }
    }
}
