//! Regen Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for regen, an
//! incremental template regeneration engine, following hexagonal (ports and
//! adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │      regen-cli (host shim, watcher)     │
//! │    feeds Notifications to the intake    │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  GenerationController, TemplateCache,   │
//! │  DependencyResolver, RenderQueue/Worker │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │  ProjectModel, Filesystem, Compiler,    │
//! │  MetadataProvider, RenderEngine, Sink   │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     regen-adapters (Infrastructure)     │
//! │ ManifestProjectModel, LocalFilesystem,  │
//! │ TomlTemplateCompiler, SimpleRenderer    │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │ Template, ProjectGraph, RenderJob,      │
//! │ HostEvent, CodeMetadata                 │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use regen_core::prelude::*;
//!
//! let queue = Arc::new(RenderQueue::new());
//! let controller = GenerationController::new(
//!     GeneratorSettings::default(),
//!     ControllerPorts { model, filesystem, compiler },
//!     queue.clone(),
//! );
//! let executor = JobExecutor::new(metadata, engine, Arc::new(NoopEventSink));
//!
//! controller.handle(HostEvent::SolutionOpened.into());
//! controller.handle(HostEvent::FileChanged("src/Core/models.tst".into()).into());
//! queue.run_pending(&executor);
//! ```

pub mod domain;

pub mod application;

pub mod error;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ChannelEventSink, Command, ControllerPorts, DependencyResolver, EnqueueOutcome,
        EventIntake, GenerationController, JobExecutor, NoopEventSink, QueueStats, RenderQueue,
        RenderWorker, TemplateCache, TemplateDiscovery, commands_for,
        ports::{
            EventSink, Filesystem, MetadataProvider, ProjectModel, RenderEngine,
            TemplateCompiler,
        },
    };
    pub use crate::domain::{
        CodeMetadata, CompiledTemplate, ConsumerScope, Extension, FileRef, GeneratorSettings,
        HostEvent, JobKind, Notification, ProjectEntry, ProjectGraph, ProjectId, RenderJob,
        Template, TemplateId, TypeDecl, TypeKind,
    };
    pub use crate::error::{RegenError, RegenResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
