//! Application layer for regen.
//!
//! This layer contains:
//! - **Services**: template cache, discovery, dependency resolution, render
//!   queue and worker, job execution, and the generation controller
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer; the rules for what a
//! template, job or event *is* live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{
    CacheState, ChannelEventSink, Command, ControllerPorts, DependencyResolver, EnqueueOutcome,
    EventIntake, GenerationController, JobExecutor, NoopEventSink, QueueStats, RenderQueue,
    RenderWorker, TemplateCache, TemplateDiscovery, commands_for,
};

// Re-export port traits (for adapter implementation)
pub use ports::{
    EventSink, Filesystem, MetadataProvider, ProjectModel, RenderEngine, TemplateCompiler,
};

pub use error::ApplicationError;
