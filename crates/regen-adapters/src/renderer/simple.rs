//! Placeholder-substitution renderer.

use std::{path::Path, sync::Arc};

use regen_core::{
    application::{
        ApplicationError,
        ports::{Filesystem, RenderEngine},
    },
    domain::{CodeMetadata, Template},
    error::RegenResult,
};
use tracing::{debug, instrument};

use super::{TYPES_CLOSE, TYPES_OPEN};

/// Renders a template body against a target's metadata and writes the result
/// next to the target, named `<stem><output extension>`.
pub struct SimpleRenderer {
    filesystem: Arc<dyn Filesystem>,
}

impl SimpleRenderer {
    pub fn new(filesystem: Arc<dyn Filesystem>) -> Self {
        Self { filesystem }
    }

    /// Expand `body` for `metadata` without touching the filesystem.
    pub fn render_to_string(body: &str, metadata: &CodeMetadata) -> String {
        let expanded = expand_type_sections(body, metadata);
        expanded
            .replace("{{FILE_NAME}}", &metadata.file_name())
            .replace("{{FILE_STEM}}", &metadata.file_stem())
            .replace("{{NAMESPACE}}", metadata.namespace.as_deref().unwrap_or_default())
            .replace("{{TYPE_COUNT}}", &metadata.types.len().to_string())
    }
}

impl RenderEngine for SimpleRenderer {
    #[instrument(skip_all, fields(template = %template.id(), target = %metadata.path().display()))]
    fn render_file(&self, template: &Template, metadata: &CodeMetadata) -> RegenResult<bool> {
        if metadata.types.is_empty() {
            debug!("target declares no types, nothing to render");
            return Ok(false);
        }

        if template.compiled().output_extension.matches(metadata.path()) {
            return Err(ApplicationError::RenderingFailed {
                path: metadata.path().to_path_buf(),
                reason: format!(
                    "template '{}' would overwrite the file it renders from",
                    template.id()
                ),
            }
            .into());
        }

        let output = template.output_path_for(metadata.path());
        let content = Self::render_to_string(&template.compiled().body, metadata);
        self.filesystem.write_file(&output, &content)?;

        debug!(output = %output.display(), "output written");
        Ok(true)
    }

    fn delete_output(&self, template: &Template, target: &Path) -> RegenResult<()> {
        let output = template.output_path_for(target);
        if self.filesystem.exists(&output) {
            self.filesystem.remove_file(&output)?;
            debug!(output = %output.display(), "output removed");
        }
        Ok(())
    }

    fn rename_output(&self, template: &Template, old: &Path, new: &Path) -> RegenResult<()> {
        let from = template.output_path_for(old);
        if !self.filesystem.exists(&from) {
            return Ok(());
        }
        let to = template.output_path_for(new);
        self.filesystem.rename(&from, &to)?;
        debug!(from = %from.display(), to = %to.display(), "output moved");
        Ok(())
    }
}

fn expand_type_sections(body: &str, metadata: &CodeMetadata) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(start) = rest.find(TYPES_OPEN) {
        let after = &rest[start + TYPES_OPEN.len()..];
        let Some(end) = after.find(TYPES_CLOSE) else {
            break;
        };

        out.push_str(&rest[..start]);
        let section = &after[..end];
        for decl in &metadata.types {
            out.push_str(
                &section
                    .replace("{{name}}", &decl.name)
                    .replace("{{kind}}", &decl.kind.to_string()),
            );
        }
        rest = &after[end + TYPES_CLOSE.len()..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::filesystem::MemoryFilesystem;
    use regen_core::domain::{CompiledTemplate, Extension, ProjectEntry, ProjectId, TypeKind};

    fn template(body: &str) -> Template {
        Template::new(
            ProjectEntry::new("/sln/Core/models.tst", ProjectId::from("Core")),
            CompiledTemplate::new("models", Extension::new(".ts").unwrap(), body),
        )
    }

    fn user_metadata() -> CodeMetadata {
        CodeMetadata::new("/sln/App/User.cs")
            .with_namespace("App.Models")
            .with_type(TypeKind::Class, "User")
            .with_type(TypeKind::Enum, "Role")
    }

    #[test]
    fn substitutes_file_placeholders() {
        let out = SimpleRenderer::render_to_string(
            "{{FILE_NAME}}|{{FILE_STEM}}|{{NAMESPACE}}|{{TYPE_COUNT}}",
            &user_metadata(),
        );
        assert_eq!(out, "User.cs|User|App.Models|2");
    }

    #[test]
    fn repeats_type_sections() {
        let out = SimpleRenderer::render_to_string(
            "// {{FILE_STEM}}\n{{#types}}export type {{name}} = '{{kind}}';\n{{/types}}",
            &user_metadata(),
        );
        assert_eq!(
            out,
            "// User\nexport type User = 'class';\nexport type Role = 'enum';\n"
        );
    }

    #[test]
    fn missing_namespace_renders_empty() {
        let metadata = CodeMetadata::new("/a/B.cs").with_type(TypeKind::Struct, "B");
        assert_eq!(SimpleRenderer::render_to_string("[{{NAMESPACE}}]", &metadata), "[]");
    }

    #[test]
    fn writes_output_next_to_target() {
        let fs = MemoryFilesystem::new();
        let renderer = SimpleRenderer::new(Arc::new(fs.clone()));

        let rendered = renderer
            .render_file(&template("{{#types}}{{name}} {{/types}}"), &user_metadata())
            .unwrap();

        assert!(rendered);
        assert_eq!(
            fs.read_file(Path::new("/sln/App/User.ts")).as_deref(),
            Some("User Role ")
        );
    }

    #[test]
    fn refuses_to_overwrite_the_target() {
        let fs = MemoryFilesystem::new().with_file("/sln/App/User.cs", "class User {}");
        let renderer = SimpleRenderer::new(Arc::new(fs.clone()));
        let clobber = Template::new(
            ProjectEntry::new("/sln/Core/clobber.tst", ProjectId::from("Core")),
            CompiledTemplate::new("clobber", Extension::new(".CS").unwrap(), "x"),
        );

        assert!(renderer.render_file(&clobber, &user_metadata()).is_err());
        assert_eq!(
            fs.read_file(Path::new("/sln/App/User.cs")).as_deref(),
            Some("class User {}")
        );
    }

    #[test]
    fn target_without_types_is_a_soft_failure() {
        let fs = MemoryFilesystem::new();
        let renderer = SimpleRenderer::new(Arc::new(fs.clone()));

        let rendered = renderer
            .render_file(&template("x"), &CodeMetadata::new("/sln/App/Empty.cs"))
            .unwrap();

        assert!(!rendered);
        assert!(fs.list_files().is_empty());
    }

    #[test]
    fn delete_and_rename_follow_the_target() {
        let fs = MemoryFilesystem::new().with_file("/sln/App/User.ts", "old");
        let renderer = SimpleRenderer::new(Arc::new(fs.clone()));
        let t = template("x");

        renderer
            .rename_output(&t, Path::new("/sln/App/User.cs"), Path::new("/sln/App/Person.cs"))
            .unwrap();
        assert_eq!(fs.list_files(), vec![PathBuf::from("/sln/App/Person.ts")]);

        renderer.delete_output(&t, Path::new("/sln/App/Person.cs")).unwrap();
        assert!(fs.list_files().is_empty());

        // Nothing to delete or move is not an error.
        renderer.delete_output(&t, Path::new("/sln/App/Person.cs")).unwrap();
        renderer
            .rename_output(&t, Path::new("/sln/App/Gone.cs"), Path::new("/sln/App/New.cs"))
            .unwrap();
    }
}
