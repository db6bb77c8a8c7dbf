//! Filesystem adapters.

mod local;
mod memory;

pub use local::walk_files;
pub use local::LocalFilesystem;
pub use memory::MemoryFilesystem;
