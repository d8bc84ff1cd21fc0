//! strata core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for strata, a
//! "project as code" synthesizer: a project is declared as a tree of
//! components, and synthesis renders that tree to files on disk, deleting
//! stale generated files along the way. Projects also carry named tasks that
//! can spawn one another.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           strata-cli (CLI)              │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (SynthService, TaskRunner, cleanup)    │
//! │         Orchestrates Use Cases          │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │   (Driven: Filesystem, CommandExecutor) │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     strata-adapters (Infrastructure)    │
//! │  (LocalFilesystem, ShellExecutor, etc)  │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │  (ProjectTree, TaskRegistry, TaskGraph) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use strata_core::prelude::*;
//! # fn run(filesystem: Box<dyn Filesystem>) -> StrataResult<()> {
//!
//! // 1. Declare the project
//! let mut tree = ProjectTree::new(ProjectOptions::new("my-project"))?;
//! let root = tree.root();
//! tree.add_git_ignore(root, "/target")?;
//! tree.add_task(root, "build", TaskOptions::described("Compile"))?
//!     .exec("cargo build")?;
//!
//! // 2. Synthesize it (with an injected filesystem adapter)
//! let report = SynthService::new(filesystem).synth(&mut tree)?;
//! println!("wrote {} files", report.written.len());
//! # Ok(())
//! # }
//! ```

// Re-export domain layer (stable, well-defined API)
pub mod domain;

// Re-export application layer (orchestration logic)
pub mod application;

// Re-export error types
pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        RunOptions, SynthOptions, SynthService, TaskRunner,
        ports::{CommandExecutor, Filesystem},
    };
    pub use crate::domain::{
        CommentStyle, Component, Features, FileComponent, ProjectOptions, ProjectState,
        ProjectTree, SampleFile, Step, SubprojectOptions, TaskOptions, TaskRegistry, TextFile,
    };
    pub use crate::error::{StrataError, StrataResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
