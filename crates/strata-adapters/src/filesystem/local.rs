//! Local filesystem adapter using std::fs.

use std::io;
use std::path::{Path, PathBuf};

use tracing::trace;
use walkdir::WalkDir;

use strata_core::{
    application::{ApplicationError, ports::Filesystem},
    domain::Permissions,
    error::{StrataError, StrataResult},
};

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
    fn create_dir_all(&self, path: &Path) -> StrataResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> StrataResult<()> {
        // Generated files are read-only; lift that before replacing them.
        make_writable(path)?;
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn read_file(&self, path: &Path) -> StrataResult<Option<Vec<u8>>> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(map_io_error(path, e, "read file")),
        }
    }

    fn set_permissions(&self, path: &Path, permissions: Permissions) -> StrataResult<()> {
        let metadata =
            std::fs::metadata(path).map_err(|e| map_io_error(path, e, "get metadata"))?;
        let mut perms = metadata.permissions();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = perms.mode();
            let mode = if permissions.executable() {
                mode | 0o111
            } else {
                mode & !0o111
            };
            let mode = if permissions.readonly() {
                mode & !0o222
            } else {
                mode | 0o200
            };
            perms.set_mode(mode);
        }

        #[cfg(not(unix))]
        {
            #[allow(clippy::permissions_set_readonly_false)]
            perms.set_readonly(permissions.readonly());
        }
        std::fs::set_permissions(path, perms).map_err(|e| map_io_error(path, e, "set permissions"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn list_files(&self, dir: &Path) -> StrataResult<Vec<PathBuf>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
            match entry {
                Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
                Ok(_) => {}
                // Deleted while we were walking.
                Err(e) if e.io_error().map(io::Error::kind) == Some(io::ErrorKind::NotFound) => {
                    trace!(error = %e, "entry vanished during walk");
                }
                Err(e) => {
                    let path = e.path().unwrap_or(dir).to_path_buf();
                    return Err(ApplicationError::FilesystemError {
                        path,
                        reason: format!("Failed to list directory: {e}"),
                    }
                    .into());
                }
            }
        }
        Ok(files)
    }

    fn remove_file(&self, path: &Path) -> StrataResult<bool> {
        make_writable(path)?;
        match std::fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(map_io_error(path, e, "remove file")),
        }
    }

    fn remove_dir_if_empty(&self, dir: &Path) -> StrataResult<bool> {
        let mut entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(map_io_error(dir, e, "read directory")),
        };
        if entries.next().is_some() {
            return Ok(false);
        }
        match std::fs::remove_dir(dir) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(map_io_error(dir, e, "remove directory")),
        }
    }
}

/// Clear the read-only flag on an existing file. Missing files are fine.
fn make_writable(path: &Path) -> StrataResult<()> {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(map_io_error(path, e, "get metadata")),
    };
    if !metadata.is_file() || !metadata.permissions().readonly() {
        return Ok(());
    }

    let mut perms = metadata.permissions();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        perms.set_mode(perms.mode() | 0o200);
    }
    #[cfg(not(unix))]
    {
        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
    }
    std::fs::set_permissions(path, perms).map_err(|e| map_io_error(path, e, "set permissions"))
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> StrataError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn read_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        assert_eq!(fs.read_file(&dir.path().join("nope")).unwrap(), None);
    }

    #[test]
    fn read_only_files_can_be_rewritten_and_removed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gen.txt");
        let fs = LocalFilesystem::new();

        fs.write_file(&path, b"one").unwrap();
        fs.set_permissions(&path, Permissions::read_only()).unwrap();
        assert!(std::fs::metadata(&path).unwrap().permissions().readonly());

        fs.write_file(&path, b"two").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"two");

        fs.set_permissions(&path, Permissions::read_only()).unwrap();
        assert!(fs.remove_file(&path).unwrap());
        assert!(!fs.remove_file(&path).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn executable_bit_is_applied() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.sh");
        let fs = LocalFilesystem::new();
        fs.write_file(&path, b"#!/bin/sh\n").unwrap();
        fs.set_permissions(&path, Permissions::read_only().with_executable(true))
            .unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
        assert_eq!(mode & 0o222, 0);
    }

    #[test]
    fn list_files_is_recursive_and_tolerates_missing_dir() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        assert!(fs.list_files(&dir.path().join("absent")).unwrap().is_empty());

        fs.create_dir_all(&dir.path().join("a/b")).unwrap();
        fs.write_file(&dir.path().join("a/b/c.txt"), b"c").unwrap();
        fs.write_file(&dir.path().join("top.txt"), b"t").unwrap();

        let files = fs.list_files(dir.path()).unwrap();
        assert_eq!(
            files,
            [dir.path().join("a/b/c.txt"), dir.path().join("top.txt")]
        );
    }

    #[test]
    fn remove_dir_if_empty_only_removes_empty_dirs() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let full = dir.path().join("full");
        fs.create_dir_all(&full).unwrap();
        fs.write_file(&full.join("x"), b"x").unwrap();
        let empty = dir.path().join("empty");
        fs.create_dir_all(&empty).unwrap();

        assert!(!fs.remove_dir_if_empty(&full).unwrap());
        assert!(fs.remove_dir_if_empty(&empty).unwrap());
        assert!(!fs.remove_dir_if_empty(&empty).unwrap());
    }
}
