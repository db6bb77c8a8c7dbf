//! Coalescing render queue.
//!
//! Jobs are keyed by [`JobKey`] (kind + primary target). At most one job per
//! key is pending; a second enqueue for a pending key merges into it. A key
//! whose job is currently running may gain one new pending job, which is
//! held back until the running job completes.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    panic::{self, AssertUnwindSafe},
    sync::{Mutex, MutexGuard, PoisonError},
};

use tokio::sync::Notify;
use tracing::{debug, error, instrument, trace};

use crate::{
    application::services::JobExecutor,
    domain::{JobKey, RenderJob},
};

/// Result of [`RenderQueue::enqueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// A new pending job was created.
    Queued,
    /// The job was merged into a pending job with the same key.
    Coalesced,
}

/// Counters since the queue was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub enqueued: u64,
    pub coalesced: u64,
    pub executed: u64,
    pub failed: u64,
}

#[derive(Default)]
struct QueueState {
    order: VecDeque<JobKey>,
    pending: HashMap<JobKey, RenderJob>,
    running: HashSet<JobKey>,
    stats: QueueStats,
}

/// Serialized work queue feeding the [`JobExecutor`].
#[derive(Default)]
pub struct RenderQueue {
    state: Mutex<QueueState>,
    notify: Notify,
}

impl RenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a job, merging it into a pending job with the same key.
    ///
    /// Never blocks on rendering.
    pub fn enqueue(&self, job: RenderJob) -> EnqueueOutcome {
        let key = job.key();
        let outcome = {
            let mut guard = self.lock();
            let state = &mut *guard;
            state.stats.enqueued += 1;

            match state.pending.get_mut(&key) {
                Some(pending) => {
                    pending.merge(job);
                    state.stats.coalesced += 1;
                    EnqueueOutcome::Coalesced
                }
                None => {
                    state.pending.insert(key.clone(), job);
                    state.order.push_back(key.clone());
                    EnqueueOutcome::Queued
                }
            }
        };

        trace!(key = %key, outcome = ?outcome, "job enqueued");
        self.notify.notify_one();
        outcome
    }

    /// Number of pending jobs.
    pub fn len(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> QueueStats {
        self.lock().stats
    }

    /// Run one pass: every job that was pending when the pass started.
    ///
    /// Jobs enqueued while the pass runs (including ones raised by failures)
    /// wait for the next pass. A job whose executor panics counts as failed
    /// and releases its key. Returns the number of jobs executed.
    #[instrument(skip_all)]
    pub fn run_pending(&self, executor: &JobExecutor) -> usize {
        let budget = self.len();
        let mut executed = 0;

        for _ in 0..budget {
            let Some(job) = self.take_next() else {
                break;
            };
            let key = job.key();

            let ok = match panic::catch_unwind(AssertUnwindSafe(|| executor.execute(&job))) {
                Ok(ok) => ok,
                Err(_) => {
                    error!(key = %key, "render job panicked");
                    false
                }
            };
            self.finish(&key, ok);
            executed += 1;
        }

        if executed > 0 {
            debug!(executed, remaining = self.len(), "render pass finished");
        }
        executed
    }

    /// Wait until a job is enqueued.
    pub async fn notified(&self) {
        self.notify.notified().await;
    }

    /// Pop the oldest pending job whose key is not running, marking it running.
    fn take_next(&self) -> Option<RenderJob> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let position = state
            .order
            .iter()
            .position(|key| !state.running.contains(key))?;
        let key = state.order.remove(position)?;
        let job = state.pending.remove(&key)?;
        state.running.insert(key);
        Some(job)
    }

    fn finish(&self, key: &JobKey, ok: bool) {
        let mut state = self.lock();
        state.running.remove(key);
        state.stats.executed += 1;
        if !ok {
            state.stats.failed += 1;
        }
    }

    // The executor runs outside the lock, so a poisoned lock can only come
    // from a panic inside these short critical sections.
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
