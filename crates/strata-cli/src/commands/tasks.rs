//! `strata tasks` — list the tasks in `.strata/tasks.json`.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde_json::json;

use strata_core::domain::{TASKS_MANIFEST_PATH, TaskRegistry};

use crate::{
    cli::{GlobalArgs, TasksArgs},
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

pub fn execute(args: TasksArgs, global: GlobalArgs, output: OutputManager) -> CliResult<()> {
    let dir = global.project_dir()?;
    let registry = load_registry(&dir)?;

    if output.is_json() {
        let tasks: Vec<_> = registry
            .all()
            .map(|task| {
                json!({
                    "name": task.name(),
                    "description": task.description(),
                    "steps": task.steps(),
                })
            })
            .collect();
        output.json(&tasks)?;
        return Ok(());
    }

    if registry.is_empty() {
        output.info("No tasks defined")?;
        return Ok(());
    }

    output.header("Tasks:")?;
    let width = registry.all().map(|t| t.name().len()).max().unwrap_or(0);
    for task in registry.all() {
        output.row(task.name(), task.description().unwrap_or(""), width)?;
        if args.steps {
            for step in task.steps() {
                output.print(&format!("  {:width$}    {}", "", step.kind))?;
            }
        }
    }
    Ok(())
}

/// Read the task registry the last synthesis wrote for the project in `dir`.
pub fn load_registry(dir: &Path) -> CliResult<TaskRegistry> {
    let path = dir.join(TASKS_MANIFEST_PATH);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(CliError::TasksManifestNotFound { path });
        }
        Err(e) => {
            return Err(CliError::IoError {
                message: format!("failed to read '{}'", path.display()),
                source: e,
            });
        }
    };
    serde_json::from_str(&raw).with_cli_context(|| format!("'{}' is not a task manifest", path.display()))
}
