//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `strata-adapters` crate provides implementations.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::domain::Permissions;
use crate::error::StrataResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `strata_adapters::filesystem::LocalFilesystem` (production)
/// - `strata_adapters::filesystem::MemoryFilesystem` (testing)
///
/// ## Design Notes
///
/// - Paths are absolute; the services resolve them against project outdirs
/// - Content is raw bytes so binary generated files round-trip
/// - Permissions are capability-based, not Unix-specific
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> StrataResult<()>;

    /// Write content to a file, replacing it even if it is read-only.
    fn write_file(&self, path: &Path, content: &[u8]) -> StrataResult<()>;

    /// Read a file. `Ok(None)` when nothing exists at `path`.
    fn read_file(&self, path: &Path) -> StrataResult<Option<Vec<u8>>>;

    /// Apply read-only and executable flags.
    fn set_permissions(&self, path: &Path, permissions: Permissions) -> StrataResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Every regular file under `dir`, recursively, as absolute paths.
    ///
    /// Symlinks are not followed. A missing `dir` yields an empty list.
    fn list_files(&self, dir: &Path) -> StrataResult<Vec<PathBuf>>;

    /// Remove a file. `Ok(false)` when it was already gone.
    fn remove_file(&self, path: &Path) -> StrataResult<bool>;

    /// Remove `dir` if it is an empty directory. `Ok(false)` otherwise.
    fn remove_dir_if_empty(&self, dir: &Path) -> StrataResult<bool>;
}

/// A shell command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub command: String,
    pub cwd: PathBuf,
    /// Complete environment of the child process.
    pub env: BTreeMap<String, String>,
}

/// How a command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Port for running shell commands.
///
/// Implemented by:
/// - `strata_adapters::executor::ShellExecutor` (production)
/// - `strata_adapters::executor::RecordingExecutor` (testing)
pub trait CommandExecutor: Send + Sync {
    /// Run `spec` to completion, inheriting stdio.
    ///
    /// A non-zero exit is a normal outcome; `Err` means the command could
    /// not be started.
    fn execute(&self, spec: &CommandSpec) -> StrataResult<CommandOutcome>;
}
