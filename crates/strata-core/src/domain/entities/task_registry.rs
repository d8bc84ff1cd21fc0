use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::task::{Task, TaskOptions},
    error::DomainError,
};

/// Per-project set of tasks, keyed by unique name.
///
/// Serializes to the document stored in `.strata/tasks.json`, which is what
/// `strata run` reads back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRegistry {
    /// Environment shared by every task.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    env: BTreeMap<String, String>,
    #[serde(default)]
    tasks: BTreeMap<String, Task>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new task.
    ///
    /// Fails with [`DomainError::DuplicateTask`] if the name is taken.
    pub fn add_task(
        &mut self,
        name: impl Into<String>,
        options: TaskOptions,
    ) -> Result<&mut Task, DomainError> {
        let name = name.into();
        if self.tasks.contains_key(&name) {
            return Err(DomainError::DuplicateTask { name });
        }
        let task = Task::new(name.clone(), options)?;
        Ok(self.tasks.entry(name).or_insert(task))
    }

    /// Remove a task by name.
    ///
    /// Returns `Ok(None)` when no such task exists. Fails with
    /// [`DomainError::TaskInUse`] while another task still spawns it.
    pub fn remove_task(&mut self, name: &str) -> Result<Option<Task>, DomainError> {
        if !self.tasks.contains_key(name) {
            return Ok(None);
        }

        let dependents: Vec<String> = self
            .tasks
            .values()
            .filter(|t| t.name() != name && t.spawned_tasks().any(|s| s == name))
            .map(|t| t.name().to_string())
            .collect();
        if !dependents.is_empty() {
            return Err(DomainError::TaskInUse {
                name: name.into(),
                dependents,
            });
        }

        Ok(self.tasks.remove(name))
    }

    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    pub fn task_mut(&mut self, name: &str) -> Option<&mut Task> {
        self.tasks.get_mut(name)
    }

    /// Like [`Self::task_mut`] but reports a missing task as an error.
    pub fn try_task_mut(&mut self, name: &str) -> Result<&mut Task, DomainError> {
        self.tasks
            .get_mut(name)
            .ok_or_else(|| DomainError::TaskNotFound {
                name: name.into(),
                referenced_by: None,
            })
    }

    /// All tasks, ordered by name.
    pub fn all(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Add a variable to the environment shared by every task.
    pub fn add_environment(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.env.insert(key.into(), value.into());
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Check that a deserialized registry is keyed consistently.
    pub fn validate(&self) -> Result<(), DomainError> {
        for (key, task) in &self.tasks {
            if key != task.name() {
                return Err(DomainError::InvalidManifest(format!(
                    "task stored under '{key}' is named '{}'",
                    task.name()
                )));
            }
            crate::domain::entities::task::validate_task_name(key)?;
        }
        Ok(())
    }

    pub(crate) fn mark_resolved<'a>(&mut self, names: impl IntoIterator<Item = &'a String>) {
        for name in names {
            if let Some(task) = self.tasks.get_mut(name) {
                task.mark_resolved();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::task::TaskState;

    #[test]
    fn duplicate_task_name_is_rejected() {
        let mut reg = TaskRegistry::new();
        reg.add_task("build", TaskOptions::default()).unwrap();

        let err = reg.add_task("build", TaskOptions::default()).unwrap_err();
        assert_eq!(
            err,
            DomainError::DuplicateTask {
                name: "build".into()
            }
        );
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn remove_missing_task_is_not_an_error() {
        let mut reg = TaskRegistry::new();
        assert_eq!(reg.remove_task("nope").unwrap(), None);
    }

    #[test]
    fn remove_returns_the_task() {
        let mut reg = TaskRegistry::new();
        reg.add_task("lint", TaskOptions::described("Lint sources"))
            .unwrap()
            .exec("cargo clippy")
            .unwrap();

        let removed = reg.remove_task("lint").unwrap().unwrap();
        assert_eq!(removed.description(), Some("Lint sources"));
        assert!(reg.task("lint").is_none());
    }

    #[test]
    fn remove_refuses_while_spawned() {
        let mut reg = TaskRegistry::new();
        reg.add_task("compile", TaskOptions::default()).unwrap();
        reg.add_task("build", TaskOptions::default())
            .unwrap()
            .spawn("compile")
            .unwrap();

        let err = reg.remove_task("compile").unwrap_err();
        assert!(matches!(err, DomainError::TaskInUse { ref dependents, .. } if dependents == &["build"]));
        assert!(reg.task("compile").is_some());
    }

    #[test]
    fn all_is_sorted_by_name() {
        let mut reg = TaskRegistry::new();
        for name in ["test", "build", "lint"] {
            reg.add_task(name, TaskOptions::default()).unwrap();
        }
        let names: Vec<_> = reg.all().map(Task::name).collect();
        assert_eq!(names, ["build", "lint", "test"]);
    }

    #[test]
    fn mark_resolved_only_touches_named_tasks() {
        let mut reg = TaskRegistry::new();
        reg.add_task("a", TaskOptions::default()).unwrap();
        reg.add_task("b", TaskOptions::default()).unwrap();
        reg.mark_resolved(&["a".to_string()]);

        assert_eq!(reg.task("a").unwrap().state(), TaskState::Resolved);
        assert_eq!(reg.task("b").unwrap().state(), TaskState::Defined);
    }

    #[test]
    fn json_document_round_trips() {
        let mut reg = TaskRegistry::new();
        reg.add_environment("CI", "1");
        reg.add_task("build", TaskOptions::described("Build").with_env("PROFILE", "dev"))
            .unwrap()
            .exec("cargo build")
            .unwrap();

        let json = serde_json::to_string(&reg).unwrap();
        let back: TaskRegistry = serde_json::from_str(&json).unwrap();
        back.validate().unwrap();
        assert_eq!(back, reg);
    }

    #[test]
    fn validate_rejects_mismatched_keys() {
        let doc = r#"{ "tasks": { "build": { "name": "compile" } } }"#;
        let reg: TaskRegistry = serde_json::from_str(doc).unwrap();
        assert!(matches!(reg.validate(), Err(DomainError::InvalidManifest(_))));
    }
}
