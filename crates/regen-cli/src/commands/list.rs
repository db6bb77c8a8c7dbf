//! `regen list`: show the template definitions a solution contains.

use std::sync::Arc;

use regen_core::prelude::*;
use serde::Serialize;
use tracing::instrument;

use crate::{
    cli::{ListArgs, ListFormat, OutputFormat},
    config::AppConfig,
    error::{CliResult, IntoCli},
    output::OutputManager,
    session::Session,
};

/// One listed definition.
#[derive(Debug, Serialize)]
struct TemplateRow {
    name: String,
    project: String,
    path: String,
    output_extension: String,
}

#[instrument(skip_all)]
pub fn execute(args: ListArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let session = Session::open(&args.solution.solution, config.generator, Arc::new(NoopEventSink))?;
    let templates = session.controller.cache().templates()?;

    let rows: Vec<TemplateRow> = templates
        .iter()
        .map(|t| TemplateRow {
            name: t.name().to_string(),
            project: t.project().to_string(),
            path: session.display_path(t.definition_path()),
            output_extension: t.compiled().output_extension.to_string(),
        })
        .collect();

    let format = if output.format() == OutputFormat::Json {
        ListFormat::Json
    } else {
        args.format
    };

    match format {
        ListFormat::Json => {
            output
                .json(&rows)
                .with_cli_context(|| "writing template list")?;
        }
        ListFormat::List => {
            for row in &rows {
                output.print(&row.path)?;
            }
        }
        ListFormat::Table => {
            if rows.is_empty() {
                output.warning("No template definitions found")?;
                return Ok(());
            }
            output.header(&format!("{} template(s):", rows.len()))?;
            let width = rows.iter().map(|r| r.name.len()).max().unwrap_or(0);
            for row in &rows {
                output.print(&format!(
                    "  {:width$}  {:<4}  {}  ({})",
                    row.name, row.output_extension, row.path, row.project
                ))?;
            }
        }
    }

    Ok(())
}
