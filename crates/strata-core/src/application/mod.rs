//! Application layer for strata.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (SynthService, TaskRunner, cleanup)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! modelling rules itself. Those live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{
    Builtin, BuiltinContext, RunOptions, RunReport, SynthOptions, SynthReport, SynthService,
    TaskRunner,
};

// Re-export port traits (for adapter implementation)
pub use ports::{CommandExecutor, CommandOutcome, CommandSpec, Filesystem};

pub use error::ApplicationError;
