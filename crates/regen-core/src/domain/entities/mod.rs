pub mod event;
pub mod job;
pub mod metadata;
pub mod project;
pub mod template;

pub use crate::domain::DomainError;
pub use event::{EventOrigin, HostEvent, Notification};
pub use job::{JobKey, JobKind, RenderJob};
pub use metadata::{CodeMetadata, TypeDecl, TypeKind};
pub use project::{FileRef, ProjectEntry, ProjectGraph, ProjectId};
pub use template::{CompiledTemplate, Template, TemplateId};
