//! In-memory filesystem adapter for testing.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use regen_core::{
    application::{ApplicationError, ports::Filesystem},
    domain::Extension,
    error::RegenResult,
};

/// In-memory filesystem for testing.
#[derive(Debug, Clone)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: BTreeMap<PathBuf, String>,
    directories: BTreeSet<PathBuf>,
}

impl MemoryFilesystemInner {
    fn add_ancestors(&mut self, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            self.directories.insert(current.clone());
        }
    }
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryFilesystemInner::default())),
        }
    }

    /// Seed a file (testing helper).
    pub fn with_file(self, path: impl AsRef<Path>, content: &str) -> Self {
        let path = path.as_ref();
        let mut inner = self.write();
        if let Some(parent) = path.parent() {
            inner.add_ancestors(parent);
        }
        inner.files.insert(path.to_path_buf(), content.to_string());
        drop(inner);
        self
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: &Path) -> Option<String> {
        self.read().files.get(path).cloned()
    }

    /// List all files.
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.read().files.keys().cloned().collect()
    }

    /// Clear all contents.
    pub fn clear(&self) {
        let mut inner = self.write();
        inner.files.clear();
        inner.directories.clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, MemoryFilesystemInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryFilesystemInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(path: &Path) -> regen_core::error::RegenError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: "No such file".into(),
    }
    .into()
}

impl Filesystem for MemoryFilesystem {
    fn read_to_string(&self, path: &Path) -> RegenResult<String> {
        self.read_file(path).ok_or_else(|| not_found(path))
    }

    fn write_file(&self, path: &Path, content: &str) -> RegenResult<()> {
        let mut inner = self.write();
        if let Some(parent) = path.parent() {
            inner.add_ancestors(parent);
        }
        inner.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> RegenResult<()> {
        self.write()
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| not_found(path))
    }

    fn rename(&self, from: &Path, to: &Path) -> RegenResult<()> {
        let mut inner = self.write();
        let content = inner.files.remove(from).ok_or_else(|| not_found(from))?;
        if let Some(parent) = to.parent() {
            inner.add_ancestors(parent);
        }
        inner.files.insert(to.to_path_buf(), content);
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> RegenResult<()> {
        self.write().add_ancestors(path);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let inner = self.read();
        inner.files.contains_key(path) || inner.directories.contains(path)
    }

    fn find_files(&self, root: &Path, extension: &Extension) -> RegenResult<Vec<PathBuf>> {
        let inner = self.read();
        if !inner.directories.contains(root) {
            return Err(not_found(root));
        }
        Ok(inner
            .files
            .keys()
            .filter(|p| p.starts_with(root) && extension.matches(p))
            .cloned()
            .collect())
    }
}
