// ============================================================================
// domain/error.rs - MODEL ERRORS
// ============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Root domain error type.
///
/// Every variant is a defect in the declarative model, detected eagerly at
/// registration or resolution time. None of them are retried.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Task registry
    // ========================================================================
    #[error("duplicate task '{name}': a task with this name already exists")]
    DuplicateTask { name: String },

    #[error("task '{name}' not found{}", referenced_by.as_ref().map(|r| format!(" (spawned by '{r}')")).unwrap_or_default())]
    TaskNotFound {
        name: String,
        referenced_by: Option<String>,
    },

    #[error("unable to remove task '{name}': still spawned by {}", dependents.join(", "))]
    TaskInUse {
        name: String,
        dependents: Vec<String>,
    },

    #[error("task '{name}' is locked and cannot be modified")]
    TaskLocked { name: String },

    #[error("invalid task name '{name}': {reason}")]
    InvalidTaskName { name: String, reason: String },

    #[error("cyclic task graph: {}", cycle.join(" -> "))]
    CyclicTaskGraph { cycle: Vec<String> },

    // ========================================================================
    // Project tree
    // ========================================================================
    #[error("project name must not be empty")]
    EmptyProjectName,

    #[error("outdir of sub-project '{project}' must be a relative path, got {}", path.display())]
    OutdirNotRelative { project: String, path: PathBuf },

    #[error("outdir of sub-project '{project}' escapes its parent directory: {}", path.display())]
    OutdirEscapesParent { project: String, path: PathBuf },

    #[error("outdir {} of sub-project '{project}' collides with '{existing}'", path.display())]
    OutdirCollision {
        project: String,
        existing: String,
        path: PathBuf,
    },

    #[error("outdir {} of sub-project '{project}' overlaps with sibling '{sibling}'", path.display())]
    OutdirOverlap {
        project: String,
        sibling: String,
        path: PathBuf,
    },

    #[error("parent of sub-project '{project}' does not belong to this project tree")]
    ParentMismatch { project: String },

    #[error("unknown project id {index}")]
    UnknownProject { index: usize },

    // ========================================================================
    // Files
    // ========================================================================
    #[error("two files in project '{project}' claim the same path: {}", path.display())]
    DuplicateFilePath { project: String, path: PathBuf },

    #[error("absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid glob pattern '{pattern}': {reason}")]
    InvalidGlob { pattern: String, reason: String },

    #[error("generated file '{path}' does not carry the generated-file marker")]
    MissingMarker { path: String },

    #[error("failed to render '{path}': {reason}")]
    RenderFailed { path: String, reason: String },

    // ========================================================================
    // Manifest
    // ========================================================================
    #[error("invalid project manifest: {0}")]
    InvalidManifest(String),
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::DuplicateTask { name } => vec![
                format!("Task '{}' is defined more than once", name),
                "Rename one of the tasks or extend the existing one".into(),
            ],
            Self::TaskNotFound { name, .. } => vec![
                format!("No task named '{}' is registered", name),
                "Try: strata tasks".into(),
            ],
            Self::TaskInUse { dependents, .. } => vec![
                format!("Remove the spawn steps in: {}", dependents.join(", ")),
                "Then remove the task".into(),
            ],
            Self::CyclicTaskGraph { cycle } => vec![
                format!("Tasks spawn each other in a loop: {}", cycle.join(" -> ")),
                "Break the loop by removing one of the spawn steps".into(),
            ],
            Self::OutdirNotRelative { .. } | Self::OutdirEscapesParent { .. } => vec![
                "Sub-project outdirs are relative to the parent project".into(),
                "Example: outdir = \"packages/api\"".into(),
            ],
            Self::OutdirCollision { existing, .. } | Self::OutdirOverlap { sibling: existing, .. } => {
                vec![
                    format!("Choose a directory not used by '{}'", existing),
                    "Every sub-project needs its own, non-nested outdir".into(),
                ]
            }
            Self::DuplicateFilePath { path, .. } => vec![
                format!("Only one component may generate {}", path.display()),
                "Remove or rename one of the files".into(),
            ],
            Self::InvalidGlob { .. } => vec![
                "Globs are relative to the project outdir, e.g. \"fixtures/**\"".into(),
            ],
            Self::InvalidManifest(msg) => vec![
                "Check your strata.toml".into(),
                format!("Details: {}", msg),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TaskNotFound { .. } | Self::UnknownProject { .. } => ErrorCategory::NotFound,
            Self::RenderFailed { .. } => ErrorCategory::Internal,
            _ => ErrorCategory::Validation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Internal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_lists_members_in_order() {
        let err = DomainError::CyclicTaskGraph {
            cycle: vec!["build".into(), "compile".into(), "build".into()],
        };
        assert_eq!(err.to_string(), "cyclic task graph: build -> compile -> build");
    }

    #[test]
    fn task_not_found_mentions_spawner() {
        let err = DomainError::TaskNotFound {
            name: "lint".into(),
            referenced_by: Some("build".into()),
        };
        assert_eq!(err.to_string(), "task 'lint' not found (spawned by 'build')");
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn collision_is_a_validation_error() {
        let err = DomainError::OutdirCollision {
            project: "b".into(),
            existing: "a".into(),
            path: PathBuf::from("/repo/pkgs/a"),
        };
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(err.suggestions().iter().any(|s| s.contains("'a'")));
    }
}
