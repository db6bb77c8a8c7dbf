//! `regen render`: run the save handler for every definition (or one) and
//! drain the render queue.

use std::{
    collections::BTreeSet,
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};

use regen_core::prelude::*;
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    cli::{OutputFormat, RenderArgs},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
    session::Session,
};

/// Collects the targets whose render failed.
#[derive(Debug, Default)]
struct FailedTargets(Mutex<BTreeSet<PathBuf>>);

impl FailedTargets {
    fn take(&self) -> BTreeSet<PathBuf> {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl EventSink for FailedTargets {
    fn emit(&self, notification: Notification) {
        if let HostEvent::FileChanged(path) = notification.event {
            self.0
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(path);
        }
    }
}

#[derive(Debug, Serialize)]
struct RenderReport {
    templates: usize,
    enqueued: usize,
    executed: u64,
    failed: Vec<String>,
}

#[instrument(skip_all)]
pub fn execute(args: RenderArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let failures = Arc::new(FailedTargets::default());
    let session = Session::open(&args.solution.solution, config.generator, failures.clone())?;

    let templates = session.controller.cache().templates()?;
    let selected: Vec<Arc<Template>> = match &args.template {
        Some(path) => {
            let entry = session
                .model
                .resolve_entry(path)
                .ok_or_else(|| CliError::TemplateNotFound { path: path.clone() })?;
            let template = templates
                .iter()
                .find(|t| t.definition_path() == entry.path)
                .cloned()
                .ok_or_else(|| CliError::TemplateNotFound { path: path.clone() })?;
            vec![template]
        }
        None => templates,
    };

    let spinner = output.spinner(format!("Rendering {} template(s)...", selected.len()));
    let enqueued: usize = selected
        .iter()
        .map(|t| session.controller.template_saved(t.definition_path()))
        .sum();
    session.drain();
    spinner.finish_and_clear();

    let stats = session.queue.stats();
    let failed: Vec<String> = failures
        .take()
        .iter()
        .map(|p| session.display_path(p))
        .collect();
    info!(enqueued, executed = stats.executed, failed = failed.len(), "render complete");

    if output.format() == OutputFormat::Json {
        let report = RenderReport {
            templates: selected.len(),
            enqueued,
            executed: stats.executed,
            failed,
        };
        return output
            .json(&report)
            .with_cli_context(|| "writing render report");
    }

    output.success(&format!(
        "Rendered {} file(s) from {} template(s)",
        stats.executed.saturating_sub(stats.failed),
        selected.len()
    ))?;
    if !failed.is_empty() {
        output.warning(&format!("{} file(s) produced no output:", failed.len()))?;
        for path in &failed {
            output.print(&format!("  {path}"))?;
        }
    }

    Ok(())
}
