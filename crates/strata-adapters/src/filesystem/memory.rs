//! In-memory filesystem adapter for testing.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use strata_core::{
    application::{ApplicationError, ports::Filesystem},
    domain::Permissions,
    error::StrataResult,
};

/// In-memory filesystem for testing.
///
/// Clones share the same storage, so a test can hand one clone to a service
/// and inspect the other.
#[derive(Debug, Clone)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: BTreeMap<PathBuf, Vec<u8>>,
    directories: BTreeSet<PathBuf>,
    permissions: HashMap<PathBuf, Permissions>,
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryFilesystemInner::default())),
        }
    }

    /// Seed a file, creating its parent directories (testing helper).
    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        let path = path.into();
        if let Ok(mut inner) = self.inner.write() {
            if let Some(parent) = path.parent() {
                add_ancestors(&mut inner.directories, parent);
            }
            inner.files.insert(path, content.into());
        }
    }

    /// A file's content as UTF-8 (testing helper).
    pub fn read_to_string(&self, path: &Path) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner
            .files
            .get(path)
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    /// Permissions last applied to `path`.
    pub fn permissions(&self, path: &Path) -> Option<Permissions> {
        let inner = self.inner.read().ok()?;
        inner.permissions.get(path).copied()
    }

    /// All file paths, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether `dir` is a known directory.
    pub fn is_dir(&self, dir: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.directories.contains(dir))
            .unwrap_or(false)
    }

    /// Clear all contents.
    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.files.clear();
            inner.directories.clear();
            inner.permissions.clear();
        }
    }
}

impl Default for MemoryFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> StrataResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        add_ancestors(&mut inner.directories, path);
        Ok(())
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> StrataResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        // Ensure parent exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !inner.directories.contains(parent) {
                return Err(ApplicationError::FilesystemError {
                    path: path.to_path_buf(),
                    reason: "Parent directory does not exist".into(),
                }
                .into());
            }
        }

        inner.files.insert(path.to_path_buf(), content.to_vec());
        Ok(())
    }

    fn read_file(&self, path: &Path) -> StrataResult<Option<Vec<u8>>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.files.get(path).cloned())
    }

    fn set_permissions(&self, path: &Path, permissions: Permissions) -> StrataResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        inner.permissions.insert(path.to_path_buf(), permissions);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn list_files(&self, dir: &Path) -> StrataResult<Vec<PathBuf>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner
            .files
            .keys()
            .filter(|p| p.starts_with(dir))
            .cloned()
            .collect())
    }

    fn remove_file(&self, path: &Path) -> StrataResult<bool> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        inner.permissions.remove(path);
        Ok(inner.files.remove(path).is_some())
    }

    fn remove_dir_if_empty(&self, dir: &Path) -> StrataResult<bool> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        if !inner.directories.contains(dir) {
            return Ok(false);
        }
        let occupied = inner.files.keys().any(|p| p.starts_with(dir))
            || inner.directories.iter().any(|d| d != dir && d.starts_with(dir));
        if occupied {
            return Ok(false);
        }
        inner.directories.remove(dir);
        Ok(true)
    }
}

fn add_ancestors(directories: &mut BTreeSet<PathBuf>, path: &Path) {
    let mut current = PathBuf::new();
    for component in path.components() {
        current.push(component);
        directories.insert(current.clone());
    }
}
