//! Solution/project model adapters.

mod manifest;
mod state;

pub use manifest::{MANIFEST_FILE_NAME, ManifestError, ManifestProjectModel, TopologyChange};
pub use state::{STATE_DIR, STATE_FILE, SolutionState, TemplateRecord};
