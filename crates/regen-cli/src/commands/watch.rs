//! `regen watch`: keep a solution's generated files current until Ctrl-C.
//!
//! Three tasks share one cancellation token: the polling watcher feeding the
//! intake, the intake loop driving the controller, and the render worker
//! draining the queue. Render failures travel back into the intake as
//! synthetic notifications.

use std::{sync::Arc, time::Duration};

use regen_core::prelude::*;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::{
    cli::WatchArgs,
    config::AppConfig,
    error::{CliResult, IntoCli},
    output::OutputManager,
    session::Session,
    watcher::PollingWatcher,
};

pub fn execute(args: WatchArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let interval = config.poll_interval(args.interval_ms);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .with_cli_context(|| "starting async runtime")?;

    let span = info_span!("watch", session = %Uuid::new_v4());
    runtime.block_on(watch(args, config, interval, output).instrument(span))
}

async fn watch(
    args: WatchArgs,
    config: AppConfig,
    interval: Duration,
    output: OutputManager,
) -> CliResult<()> {
    let intake = EventIntake::new();
    let session = Session::open(
        &args.solution.solution,
        config.generator,
        Arc::new(intake.sink()),
    )?;

    if args.initial {
        let enqueued = session.controller.render_all()?;
        info!(enqueued, "initial render queued");
    }

    let cancel = CancellationToken::new();
    let worker = RenderWorker::spawn(
        session.queue.clone(),
        session.executor.clone(),
        cancel.clone(),
    );
    let watcher = PollingWatcher::new(session.model.clone(), interval, intake.sender());
    let watcher = tokio::spawn(watcher.run(cancel.clone()));
    let intake = tokio::spawn(intake.run(session.controller.clone(), cancel.clone()));

    output.success(&format!(
        "Watching {} ({} project(s), every {}ms). Press Ctrl-C to stop.",
        session.root().display(),
        session.model.projects().len(),
        interval.as_millis()
    ))?;

    let signal = tokio::signal::ctrl_c().await;
    cancel.cancel();

    join("render worker", worker).await;
    join("watcher", watcher).await;
    let handled = join("intake", intake).await.unwrap_or_default();

    let stats = session.queue.stats();
    info!(
        handled,
        executed = stats.executed,
        failed = stats.failed,
        coalesced = stats.coalesced,
        "watch stopped"
    );
    signal.with_cli_context(|| "waiting for Ctrl-C")?;

    output.info(&format!(
        "Stopped after {handled} change(s): {} render(s), {} failed, {} coalesced",
        stats.executed, stats.failed, stats.coalesced
    ))?;
    Ok(())
}

async fn join<T>(task: &str, handle: JoinHandle<T>) -> Option<T> {
    match handle.await {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(task, error = %e, "task ended abnormally");
            None
        }
    }
}
