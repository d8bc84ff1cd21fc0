//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "synthesize the project" or "run a task".

pub mod cleanup;
pub mod synth_service;
pub mod task_runner;

pub use cleanup::{CleanupReport, DEFAULT_EXCLUDES, cleanup};
pub use synth_service::{SynthOptions, SynthReport, SynthService};
pub use task_runner::{
    Builtin, BuiltinContext, ExecutedStep, RunOptions, RunReport, TaskRunner,
};
