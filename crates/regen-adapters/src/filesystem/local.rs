//! Local filesystem adapter using std::fs.

use std::io;
use std::path::{Path, PathBuf};

use regen_core::{
    application::{ApplicationError, ports::Filesystem},
    domain::Extension,
    error::{RegenError, RegenResult},
};
use tracing::debug;
use walkdir::WalkDir;

/// Directories never descended into when searching for files.
const SKIPPED_DIRS: &[&str] = &[".git", ".regen", "bin", "obj", "node_modules", "target"];

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn read_to_string(&self, path: &Path) -> RegenResult<String> {
        std::fs::read_to_string(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn write_file(&self, path: &Path, content: &str) -> RegenResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.create_dir_all(parent)?;
        }
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn remove_file(&self, path: &Path) -> RegenResult<()> {
        std::fs::remove_file(path).map_err(|e| map_io_error(path, e, "remove file"))
    }

    fn rename(&self, from: &Path, to: &Path) -> RegenResult<()> {
        if let Some(parent) = to.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.create_dir_all(parent)?;
        }
        std::fs::rename(from, to).map_err(|e| map_io_error(from, e, "rename file"))
    }

    fn create_dir_all(&self, path: &Path) -> RegenResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn find_files(&self, root: &Path, extension: &Extension) -> RegenResult<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(map_io_error(
                root,
                io::Error::new(io::ErrorKind::NotFound, "not a directory"),
                "search",
            ));
        }

        let mut found: Vec<PathBuf> = walk_files(root)
            .filter(|path| extension.matches(path))
            .collect();
        found.sort();
        Ok(found)
    }
}

/// Every regular file below `root`, skipping build and tool directories.
/// Unreadable subtrees are skipped.
pub fn walk_files(root: &Path) -> impl Iterator<Item = PathBuf> + use<> {
    let root_display = root.display().to_string();
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e))
        .filter_map(move |entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(root = %root_display, error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
}

fn is_skipped_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> RegenError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}
