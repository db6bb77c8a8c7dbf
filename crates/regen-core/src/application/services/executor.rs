//! Job execution against the render engine.

use std::sync::Arc;

use tracing::{debug, error, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{EventSink, MetadataProvider, RenderEngine},
    },
    domain::{DomainValidator as validator, JobKind, Notification, RenderJob},
    error::RegenResult,
};

/// Executes render jobs.
///
/// A failed render is never retried inline. Instead exactly one synthetic
/// change notification for the job's primary target is emitted through the
/// [`EventSink`], so a later pass picks it up again.
pub struct JobExecutor {
    metadata: Arc<dyn MetadataProvider>,
    engine: Arc<dyn RenderEngine>,
    sink: Arc<dyn EventSink>,
}

impl JobExecutor {
    pub fn new(
        metadata: Arc<dyn MetadataProvider>,
        engine: Arc<dyn RenderEngine>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            metadata,
            engine,
            sink,
        }
    }

    /// Run one job. Returns `true` on success. Errors are logged, never
    /// propagated.
    #[instrument(skip_all, fields(kind = %job.kind(), target = %job.primary().display()))]
    pub fn execute(&self, job: &RenderJob) -> bool {
        let result = match job.kind() {
            JobKind::Render => self.render(job),
            JobKind::Delete => self.delete(job),
            JobKind::Rename => self.rename(job),
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "job failed");
                if job.kind() == JobKind::Render {
                    self.sink.emit(Notification::render_failure(job.primary()));
                }
                false
            }
        }
    }

    fn render(&self, job: &RenderJob) -> RegenResult<()> {
        validator::validate_job(job)?;
        if job.templates().is_empty() {
            debug!("no templates apply; nothing to render");
            return Ok(());
        }

        // Fetched fresh for every attempt.
        let metadata = self.metadata.file_metadata(job.primary())?;

        let mut failed = Vec::new();
        for template in job.templates() {
            match self.engine.render_file(template, &metadata) {
                Ok(true) => debug!(template = %template.id(), "rendered"),
                Ok(false) => {
                    warn!(template = %template.id(), "render reported failure");
                    failed.push(template.name().to_string());
                }
                Err(e) => {
                    warn!(template = %template.id(), error = %e, "render errored");
                    failed.push(template.name().to_string());
                }
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(ApplicationError::RenderingFailed {
                path: job.primary().to_path_buf(),
                reason: format!("{} template(s) failed: {}", failed.len(), failed.join(", ")),
            }
            .into())
        }
    }

    fn delete(&self, job: &RenderJob) -> RegenResult<()> {
        for template in job.templates() {
            self.engine.delete_output(template, job.primary())?;
        }
        Ok(())
    }

    fn rename(&self, job: &RenderJob) -> RegenResult<()> {
        let Some(old) = job.previous_path() else {
            return Err(ApplicationError::RenderingFailed {
                path: job.primary().to_path_buf(),
                reason: "rename job without previous path".into(),
            }
            .into());
        };
        for template in job.templates() {
            self.engine.rename_output(template, old, job.primary())?;
        }
        Ok(())
    }
}
