//! Application services - orchestrate the regeneration pipeline.
//!
//! Notifications enter through [`EventIntake`] and are classified by the
//! [`GenerationController`]. The controller invalidates the
//! [`TemplateCache`], resolves consumers with the [`DependencyResolver`] and
//! enqueues jobs on the [`RenderQueue`], which the [`RenderWorker`] drains
//! through the [`JobExecutor`].

pub mod controller;
pub mod dependency_resolver;
pub mod discovery;
pub mod executor;
pub mod intake;
pub mod render_queue;
pub mod template_cache;
pub mod worker;

pub use controller::{Command, ControllerPorts, GenerationController, commands_for};
pub use dependency_resolver::DependencyResolver;
pub use discovery::TemplateDiscovery;
pub use executor::JobExecutor;
pub use intake::{ChannelEventSink, EventIntake, NoopEventSink};
pub use render_queue::{EnqueueOutcome, QueueStats, RenderQueue};
pub use template_cache::{CacheState, TemplateCache};
pub use worker::RenderWorker;
