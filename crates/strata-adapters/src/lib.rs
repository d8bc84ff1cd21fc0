//! Infrastructure adapters for Strata.
//!
//! This crate implements the ports defined in `strata-core::application::ports`
//! and the file formats that need third-party crates. All real I/O lives here.

pub mod executor;
pub mod filesystem;
pub mod manifest_loader;
pub mod renderer;

// Re-export commonly used adapters
pub use executor::{RecordingExecutor, ShellExecutor};
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use manifest_loader::{MANIFEST_FILE, ManifestLoader, ProjectManifest};
pub use renderer::{JsonFile, TomlFile};
