use std::collections::HashSet;

use crate::domain::{
    entities::{CompiledTemplate, ProjectEntry, RenderJob},
    error::DomainError,
    value_objects::Extension,
};

/// Centralized domain validation.
///
/// All validation logic lives here, not scattered across entities.
pub struct DomainValidator;

impl DomainValidator {
    /// A compiled template must have a name and a non-blank body.
    pub fn validate_compiled_template(
        entry: &ProjectEntry,
        compiled: &CompiledTemplate,
    ) -> Result<(), DomainError> {
        let path = entry.path.display().to_string();

        if compiled.name.trim().is_empty() {
            return Err(DomainError::invalid_template(path, "template name is empty"));
        }
        if compiled.body.trim().is_empty() {
            return Err(DomainError::invalid_template(path, "template body is empty"));
        }
        Ok(())
    }

    /// Outputs are written next to their target with the output extension,
    /// so that extension must not be one whose files the generator reads.
    pub fn validate_output_extension(
        entry: &ProjectEntry,
        compiled: &CompiledTemplate,
        reserved: &[&Extension],
    ) -> Result<(), DomainError> {
        let output = &compiled.output_extension;
        if reserved.iter().any(|ext| *ext == output) {
            return Err(DomainError::invalid_template(
                entry.path.display().to_string(),
                format!("output extension '{output}' would overwrite the files it is generated from"),
            ));
        }
        Ok(())
    }

    /// Templates in one job must be distinct and must not share an output
    /// extension, since both would write the same output file.
    pub fn validate_job(job: &RenderJob) -> Result<(), DomainError> {
        let mut seen = HashSet::new();
        let mut outputs = HashSet::new();
        for template in job.templates() {
            if !seen.insert(template.id()) {
                return Err(DomainError::invalid_template(
                    template.id().to_string(),
                    format!("template listed twice in {} job", job.kind()),
                ));
            }
            if !outputs.insert(&template.compiled().output_extension) {
                return Err(DomainError::invalid_template(
                    template.id().to_string(),
                    format!(
                        "output extension '{}' is already claimed by another template in this {} job",
                        template.compiled().output_extension,
                        job.kind()
                    ),
                ));
            }
        }
        Ok(())
    }
}
