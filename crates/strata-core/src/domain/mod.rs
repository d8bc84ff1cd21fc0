//! Core domain layer for strata.
//!
//! This module holds the declarative project model: the project tree, its
//! components and files, tasks and the task graph. Filesystem and process
//! access are handled via ports defined in the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or process calls
//! - **No logging**: Events are emitted by the application services
//! - **Eager validation**: Invalid models fail at registration, not on disk
//!
// Public API - what the world sees
pub mod entities;
pub mod error;
pub mod files;
pub mod marker;
pub mod task_graph;

mod validation;

// Re-exports for convenience
pub use entities::{
    common::{Permissions, RelativePath, normalize_path},
    component::{
        Component, ComponentEntry, ComponentId, FileComponent, FileKind, FileSource,
        RenderContext, StructuredFormat,
    },
    project::{
        Features, ProjectId, ProjectOptions, ProjectState, ProjectTree, SubprojectOptions,
        TASKS_MANIFEST_PATH,
    },
    task::{Step, StepKind, StepOptions, Task, TaskOptions, TaskState},
    task_registry::TaskRegistry,
};
pub use error::{DomainError, ErrorCategory};
pub use files::{IgnoreFile, JSON_MARKER_KEY, SampleFile, TasksManifest, TextFile};
pub use marker::{CommentStyle, MARKER, contains_marker};
pub use task_graph::TaskGraph;
pub use validation::DomainValidator;
