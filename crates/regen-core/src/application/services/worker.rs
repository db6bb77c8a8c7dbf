//! Background render worker.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::application::services::{JobExecutor, RenderQueue};

/// The single logical consumer of the [`RenderQueue`].
///
/// Waits for enqueue notifications and drains the queue pass by pass on the
/// blocking pool, so rendering never stalls the async runtime.
pub struct RenderWorker;

impl RenderWorker {
    /// Spawn the worker onto the current tokio runtime.
    ///
    /// The worker stops when `cancel` fires. Jobs still pending at that point
    /// are abandoned.
    pub fn spawn(
        queue: Arc<RenderQueue>,
        executor: Arc<JobExecutor>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            debug!("render worker started");

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = queue.notified() => {}
                }

                // Drain until a pass finds nothing to do.
                loop {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let pass_queue = queue.clone();
                    let pass_executor = executor.clone();
                    let pass = tokio::task::spawn_blocking(move || {
                        pass_queue.run_pending(&pass_executor)
                    });

                    match pass.await {
                        Ok(0) => break,
                        Ok(executed) => debug!(executed, "render pass complete"),
                        Err(e) => {
                            error!(error = %e, "render pass panicked");
                            break;
                        }
                    }
                }
            }

            let abandoned = queue.len();
            if abandoned > 0 {
                info!(abandoned, "render worker stopped with pending jobs");
            } else {
                debug!("render worker stopped");
            }
        })
    }
}
