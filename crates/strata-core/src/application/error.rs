//! Application layer errors.
//!
//! These errors represent failures in orchestration, not in the model.
//! Model errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during synthesis and task execution.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// A hand-written file sits where a generated file would go.
    #[error("refusing to overwrite {path}: file was not generated by strata")]
    UserFileConflict { path: PathBuf },

    /// A command step exited unsuccessfully.
    #[error("task '{task}' failed at step {step} ({command}){}: {chain}", exit_code.map(|c| format!(" with exit code {c}")).unwrap_or_default())]
    StepFailed {
        task: String,
        step: usize,
        command: String,
        exit_code: Option<i32>,
        /// Spawn chain from the requested task down to the failing one.
        chain: String,
    },

    /// A command could not be started at all.
    #[error("failed to start '{command}': {reason}")]
    CommandSpawnFailed { command: String, reason: String },

    /// A task's required environment variable is unset.
    #[error("task '{task}' requires environment variable {variable}")]
    MissingEnv { task: String, variable: String },

    #[error("task '{task}' uses unknown builtin '{name}'")]
    UnknownBuiltin { task: String, name: String },

    #[error("builtin '{name}' failed in task '{task}': {reason}")]
    BuiltinFailed {
        task: String,
        name: String,
        reason: String,
    },

    /// Shared state access failed (lock poisoned).
    #[error("internal store lock poisoned")]
    StoreLockError,
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::UserFileConflict { path } => vec![
                format!("{} exists and has no generated-file marker", path.display()),
                "Move the file away, or rerun with --force to overwrite it".into(),
            ],
            Self::StepFailed { task, .. } => vec![
                format!("Fix the failing command in task '{}'", task),
                "Run with -v to see each step as it runs".into(),
            ],
            Self::CommandSpawnFailed { .. } => {
                vec!["Check that the command exists and is on PATH".into()]
            }
            Self::MissingEnv { variable, .. } => {
                vec![format!("Set {} and try again", variable)]
            }
            Self::UnknownBuiltin { name, .. } => vec![format!(
                "No builtin named '{}' is registered with the runner",
                name
            )],
            Self::StoreLockError => vec![
                "An internal lock was poisoned".into(),
                "Try again in a moment".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FilesystemError { .. } | Self::StoreLockError => ErrorCategory::Internal,
            Self::UserFileConflict { .. } | Self::MissingEnv { .. } => ErrorCategory::Validation,
            Self::UnknownBuiltin { .. } => ErrorCategory::NotFound,
            Self::StepFailed { .. } | Self::CommandSpawnFailed { .. } | Self::BuiltinFailed { .. } => {
                ErrorCategory::Execution
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_failure_message_includes_chain_and_code() {
        let err = ApplicationError::StepFailed {
            task: "test".into(),
            step: 1,
            command: "cargo test".into(),
            exit_code: Some(101),
            chain: "ci -> test".into(),
        };
        assert_eq!(
            err.to_string(),
            "task 'test' failed at step 1 (cargo test) with exit code 101: ci -> test"
        );
    }

    #[test]
    fn conflict_suggests_force() {
        let err = ApplicationError::UserFileConflict {
            path: PathBuf::from("README.md"),
        };
        assert!(err.suggestions().iter().any(|s| s.contains("--force")));
        assert_eq!(err.category(), ErrorCategory::Validation);
    }
}
