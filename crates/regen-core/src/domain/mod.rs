// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for regen.
//!
//! This module contains the vocabulary of incremental regeneration: templates,
//! projects and their reference graph, render jobs, host notifications, and
//! code metadata. Everything here is pure; I/O happens behind the ports in
//! `crate::application::ports`.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or host calls
//! - **Immutable entities**: templates are shared as `Arc<Template>`
//!
// Public API - what the world sees
pub mod entities;
pub mod error;
pub mod value_objects;

// Private implementation details - not visible outside domain
mod validation;

// Re-exports for convenience
pub use entities::{
    event::{EventOrigin, HostEvent, Notification},
    job::{JobKey, JobKind, RenderJob},
    metadata::{CodeMetadata, TypeDecl, TypeKind},
    project::{FileRef, ProjectEntry, ProjectGraph, ProjectId},
    template::{CompiledTemplate, Template, TemplateId},
};

pub use error::{DomainError, ErrorCategory};

pub use value_objects::{ConsumerScope, Extension, GeneratorSettings};

pub use validation::DomainValidator;
