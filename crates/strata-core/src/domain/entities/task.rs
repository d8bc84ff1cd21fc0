//! Tasks and steps.
//!
//! A [`Task`] is a named, ordered list of [`Step`]s. Steps either run a shell
//! command, invoke a built-in, print a message, or *spawn* another task by
//! name. Spawn steps are the edges of the task graph (see
//! [`crate::domain::task_graph`]).
//!
//! # Lifecycle
//!
//! ```text
//! Defined ──(first step)──▶ Building ──(graph resolved)──▶ Resolved
//! ```
//!
//! Appending to a resolved task is allowed; only an explicit [`Task::lock`]
//! makes the builders fail.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

// ── Steps ─────────────────────────────────────────────────────────────────────

/// What a step does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    /// Run a shell command.
    Exec(String),
    /// Run another task to completion, inline.
    Spawn(String),
    /// Run a named built-in registered with the runner.
    Builtin(String),
    /// Print a message.
    Say(String),
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exec(cmd) => write!(f, "exec: {cmd}"),
            Self::Spawn(task) => write!(f, "spawn: {task}"),
            Self::Builtin(name) => write!(f, "builtin: {name}"),
            Self::Say(msg) => write!(f, "say: {msg}"),
        }
    }
}

/// Per-step options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOptions {
    /// Display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Working directory, relative to the task's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
    /// Extra environment, overriding the task's.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    /// Shell command; the step is skipped when it exits non-zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// One unit of execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    #[serde(flatten)]
    pub kind: StepKind,
    #[serde(flatten)]
    pub options: StepOptions,
}

impl Step {
    pub fn exec(command: impl Into<String>) -> Self {
        Self::new(StepKind::Exec(command.into()))
    }

    pub fn spawn(task: impl Into<String>) -> Self {
        Self::new(StepKind::Spawn(task.into()))
    }

    pub fn builtin(name: impl Into<String>) -> Self {
        Self::new(StepKind::Builtin(name.into()))
    }

    pub fn say(message: impl Into<String>) -> Self {
        Self::new(StepKind::Say(message.into()))
    }

    pub fn new(kind: StepKind) -> Self {
        Self {
            kind,
            options: StepOptions::default(),
        }
    }

    pub fn with_options(mut self, options: StepOptions) -> Self {
        self.options = options;
        self
    }

    /// Name of the spawned task, if this is a spawn step.
    pub fn spawned_task(&self) -> Option<&str> {
        match &self.kind {
            StepKind::Spawn(task) => Some(task),
            _ => None,
        }
    }
}

// ── Task ──────────────────────────────────────────────────────────────────────

/// Where a task is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Registered, no steps yet.
    Defined,
    /// Steps are being appended.
    Building,
    /// Part of a graph that was resolved for execution.
    Resolved,
}

/// Options accepted by [`crate::domain::TaskRegistry::add_task`].
#[derive(Debug, Clone, Default)]
pub struct TaskOptions {
    pub description: Option<String>,
    pub steps: Vec<Step>,
    pub condition: Option<String>,
    pub env: BTreeMap<String, String>,
    pub cwd: Option<PathBuf>,
    pub required_env: Vec<String>,
}

impl TaskOptions {
    pub fn described(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn requiring_env(mut self, variable: impl Into<String>) -> Self {
        self.required_env.push(variable.into());
        self
    }
}

/// A named sequence of steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    steps: Vec<Step>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    condition: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    env: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cwd: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    required_env: Vec<String>,
    #[serde(skip)]
    locked: bool,
    #[serde(skip)]
    resolved: bool,
}

impl Task {
    pub(crate) fn new(name: impl Into<String>, options: TaskOptions) -> Result<Self, DomainError> {
        let name = name.into();
        validate_task_name(&name)?;
        Ok(Self {
            name,
            description: options.description,
            steps: options.steps,
            condition: options.condition,
            env: options.env,
            cwd: options.cwd,
            required_env: options.required_env,
            locked: false,
            resolved: false,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn cwd(&self) -> Option<&std::path::Path> {
        self.cwd.as_deref()
    }

    pub fn required_env(&self) -> &[String] {
        &self.required_env
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn state(&self) -> TaskState {
        if self.resolved {
            TaskState::Resolved
        } else if self.steps.is_empty() {
            TaskState::Defined
        } else {
            TaskState::Building
        }
    }

    /// Names of the tasks this task spawns, in step order.
    pub fn spawned_tasks(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().filter_map(Step::spawned_task)
    }

    // ── Builders ──────────────────────────────────────────────────────────

    /// Append a shell command.
    pub fn exec(&mut self, command: impl Into<String>) -> Result<&mut Self, DomainError> {
        self.push(Step::exec(command))
    }

    /// Append a shell command with step options.
    pub fn exec_with(
        &mut self,
        command: impl Into<String>,
        options: StepOptions,
    ) -> Result<&mut Self, DomainError> {
        self.push(Step::exec(command).with_options(options))
    }

    /// Append a spawn of another task.
    pub fn spawn(&mut self, task: impl Into<String>) -> Result<&mut Self, DomainError> {
        self.push(Step::spawn(task))
    }

    /// Append a spawn of another task with step options.
    pub fn spawn_with(
        &mut self,
        task: impl Into<String>,
        options: StepOptions,
    ) -> Result<&mut Self, DomainError> {
        self.push(Step::spawn(task).with_options(options))
    }

    /// Append a built-in step.
    pub fn builtin(&mut self, name: impl Into<String>) -> Result<&mut Self, DomainError> {
        self.push(Step::builtin(name))
    }

    /// Append a message step.
    pub fn say(&mut self, message: impl Into<String>) -> Result<&mut Self, DomainError> {
        self.push(Step::say(message))
    }

    /// Insert a shell command before every existing step.
    pub fn prepend_exec(&mut self, command: impl Into<String>) -> Result<&mut Self, DomainError> {
        self.insert_front(Step::exec(command))
    }

    /// Insert a spawn before every existing step.
    pub fn prepend_spawn(&mut self, task: impl Into<String>) -> Result<&mut Self, DomainError> {
        self.insert_front(Step::spawn(task))
    }

    /// Remove all steps.
    pub fn reset(&mut self) -> Result<&mut Self, DomainError> {
        self.ensure_unlocked()?;
        self.steps.clear();
        self.resolved = false;
        Ok(self)
    }

    /// Set or override an environment variable for every step.
    pub fn set_env(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self, DomainError> {
        self.ensure_unlocked()?;
        self.env.insert(key.into(), value.into());
        Ok(self)
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<&mut Self, DomainError> {
        self.ensure_unlocked()?;
        self.description = Some(description.into());
        Ok(self)
    }

    pub fn set_condition(&mut self, condition: impl Into<String>) -> Result<&mut Self, DomainError> {
        self.ensure_unlocked()?;
        self.condition = Some(condition.into());
        Ok(self)
    }

    /// Forbid any further modification.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub(crate) fn mark_resolved(&mut self) {
        self.resolved = true;
    }

    fn push(&mut self, step: Step) -> Result<&mut Self, DomainError> {
        self.ensure_unlocked()?;
        self.steps.push(step);
        Ok(self)
    }

    fn insert_front(&mut self, step: Step) -> Result<&mut Self, DomainError> {
        self.ensure_unlocked()?;
        self.steps.insert(0, step);
        Ok(self)
    }

    fn ensure_unlocked(&self) -> Result<(), DomainError> {
        if self.locked {
            return Err(DomainError::TaskLocked {
                name: self.name.clone(),
            });
        }
        Ok(())
    }
}

pub(crate) fn validate_task_name(name: &str) -> Result<(), DomainError> {
    if name.is_empty() {
        return Err(DomainError::InvalidTaskName {
            name: name.into(),
            reason: "name must not be empty".into(),
        });
    }
    if name.chars().any(char::is_whitespace) {
        return Err(DomainError::InvalidTaskName {
            name: name.into(),
            reason: "name must not contain whitespace".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(name: &str) -> Task {
        Task::new(name, TaskOptions::default()).unwrap()
    }

    #[test]
    fn state_moves_from_defined_to_building() {
        let mut t = task("build");
        assert_eq!(t.state(), TaskState::Defined);
        t.exec("cargo build").unwrap();
        assert_eq!(t.state(), TaskState::Building);
        t.mark_resolved();
        assert_eq!(t.state(), TaskState::Resolved);
    }

    #[test]
    fn resolved_task_still_accepts_steps() {
        let mut t = task("build");
        t.mark_resolved();
        assert!(t.exec("echo late").is_ok());
        assert_eq!(t.steps().len(), 1);
    }

    #[test]
    fn locked_task_rejects_every_builder() {
        let mut t = task("release");
        t.exec("echo 1").unwrap();
        t.lock();

        assert!(matches!(t.exec("echo 2"), Err(DomainError::TaskLocked { .. })));
        assert!(t.spawn("build").is_err());
        assert!(t.prepend_exec("echo 0").is_err());
        assert!(t.reset().is_err());
        assert!(t.set_env("A", "1").is_err());
        assert_eq!(t.steps().len(), 1);
    }

    #[test]
    fn builders_chain_in_order() {
        let mut t = task("build");
        t.exec("echo 1")
            .unwrap()
            .spawn("compile")
            .unwrap()
            .say("done")
            .unwrap();
        t.prepend_exec("echo 0").unwrap();

        let kinds: Vec<_> = t.steps().iter().map(|s| s.kind.to_string()).collect();
        assert_eq!(
            kinds,
            ["exec: echo 0", "exec: echo 1", "spawn: compile", "say: done"]
        );
        assert_eq!(t.spawned_tasks().collect::<Vec<_>>(), ["compile"]);
    }

    #[test]
    fn rejects_blank_names() {
        assert!(Task::new("", TaskOptions::default()).is_err());
        assert!(Task::new("my task", TaskOptions::default()).is_err());
    }

    #[test]
    fn step_serializes_with_kind_as_key() {
        let step = Step::exec("cargo test").with_options(StepOptions {
            name: Some("test".into()),
            ..StepOptions::default()
        });
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json, serde_json::json!({ "exec": "cargo test", "name": "test" }));

        let back: Step = serde_json::from_value(json).unwrap();
        assert_eq!(back, step);
    }
}
