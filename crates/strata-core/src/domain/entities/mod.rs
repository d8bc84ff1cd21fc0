pub mod common;
pub mod component;
pub mod project;
pub mod task;
pub mod task_registry;

pub use crate::domain::DomainError;
pub use component::{Component, ComponentEntry, FileComponent};
pub use project::{ProjectId, ProjectState, ProjectTree};
pub use task::{Step, Task};
pub use task_registry::TaskRegistry;
