//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `regen-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: File operations
//!   - `ProjectModel`: Projects, their files and references
//!   - `MetadataProvider`: Code metadata of a source file
//!   - `TemplateCompiler`: Definition file parsing
//!   - `RenderEngine`: Rendering generated output
//!   - `EventSink`: Notifications raised back into the intake
//!
//! - **Driving (Input) Ports**: Called by the host, implemented by application
//!   - `GenerationController::handle`

pub mod output;

pub use output::{
    EventSink, Filesystem, MetadataProvider, ProjectModel, RenderEngine, TemplateCompiler,
};
