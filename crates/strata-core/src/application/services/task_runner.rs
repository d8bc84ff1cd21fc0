//! Task Runner - executes a task and everything it spawns.
//!
//! Execution is a direct call tree: a spawn step runs the spawned task's
//! steps inline, to completion, before the next step of the spawner. The
//! spawn graph is resolved up front, so a cycle is reported before any
//! step has run.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{CommandExecutor, CommandSpec},
    },
    domain::{DomainError, Step, StepKind, Task, TaskGraph, TaskRegistry},
    error::StrataResult,
};

/// What a builtin step sees.
#[derive(Debug)]
pub struct BuiltinContext<'a> {
    pub task: &'a str,
    pub cwd: &'a Path,
    pub env: &'a BTreeMap<String, String>,
}

/// A named in-process step.
pub trait Builtin: Send + Sync {
    fn run(&self, ctx: &BuiltinContext<'_>) -> Result<(), String>;
}

impl<F> Builtin for F
where
    F: Fn(&BuiltinContext<'_>) -> Result<(), String> + Send + Sync,
{
    fn run(&self, ctx: &BuiltinContext<'_>) -> Result<(), String> {
        self(ctx)
    }
}

/// Where and with what environment a run happens.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Project root; task and step `cwd`s are resolved against it.
    pub root: PathBuf,
    /// Base environment, usually the process environment.
    pub env: BTreeMap<String, String>,
}

impl RunOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            env: BTreeMap::new(),
        }
    }

    pub fn with_env<I, K, V>(mut self, env: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(env.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

/// A step that ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedStep {
    pub task: String,
    pub step: usize,
    pub kind: StepKind,
}

/// Outcome of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Leaf steps in execution order; spawn steps are not listed.
    pub executed: Vec<ExecutedStep>,
    /// Tasks and steps skipped by a failing condition, as `task` or `task[i]`.
    pub skipped: Vec<String>,
}

/// Executes tasks through the [`CommandExecutor`] port.
pub struct TaskRunner {
    executor: Box<dyn CommandExecutor>,
    builtins: HashMap<String, Box<dyn Builtin>>,
}

impl TaskRunner {
    pub fn new(executor: Box<dyn CommandExecutor>) -> Self {
        Self {
            executor,
            builtins: HashMap::new(),
        }
    }

    /// Register a builtin under `name`, replacing any previous one.
    pub fn with_builtin(mut self, name: impl Into<String>, builtin: impl Builtin + 'static) -> Self {
        self.builtins.insert(name.into(), Box::new(builtin));
        self
    }

    /// Run `name` and everything it spawns.
    #[instrument(skip_all, fields(task = %name))]
    pub fn run(
        &self,
        registry: &mut TaskRegistry,
        name: &str,
        options: &RunOptions,
    ) -> StrataResult<RunReport> {
        let graph = TaskGraph::build(registry);
        let closure = graph.resolve(name)?;
        debug!(tasks = ?closure, "task graph resolved");
        registry.mark_resolved(&closure);

        let mut env = options.env.clone();
        env.extend(registry.env().clone());

        let mut report = RunReport::default();
        let mut chain = Vec::new();
        self.run_task(registry, name, &env, options, &mut chain, &mut report)?;

        info!(steps = report.executed.len(), "Task complete");
        Ok(report)
    }

    fn run_task(
        &self,
        registry: &TaskRegistry,
        name: &str,
        inherited: &BTreeMap<String, String>,
        options: &RunOptions,
        chain: &mut Vec<String>,
        report: &mut RunReport,
    ) -> StrataResult<()> {
        let task = registry.task(name).ok_or_else(|| DomainError::TaskNotFound {
            name: name.into(),
            referenced_by: chain.last().cloned(),
        })?;
        chain.push(name.to_string());

        let mut env = inherited.clone();
        env.extend(task.env().clone());
        let cwd = match task.cwd() {
            Some(dir) => options.root.join(dir),
            None => options.root.clone(),
        };

        for variable in task.required_env() {
            if !env.contains_key(variable) {
                return Err(ApplicationError::MissingEnv {
                    task: name.into(),
                    variable: variable.clone(),
                }
                .into());
            }
        }

        if let Some(condition) = task.condition() {
            if !self.condition_holds(condition, &cwd, &env)? {
                info!(task = name, "condition not met, skipping task");
                report.skipped.push(name.to_string());
                chain.pop();
                return Ok(());
            }
        }

        for (index, step) in task.steps().iter().enumerate() {
            if let Err(err) = self.run_step(registry, task, index, step, &cwd, &env, options, chain, report) {
                if chain.len() > 1 {
                    warn!(task = name, step = index, "aborting: {err}");
                }
                return Err(err);
            }
        }

        chain.pop();
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn run_step(
        &self,
        registry: &TaskRegistry,
        task: &Task,
        index: usize,
        step: &Step,
        task_cwd: &Path,
        task_env: &BTreeMap<String, String>,
        options: &RunOptions,
        chain: &mut Vec<String>,
        report: &mut RunReport,
    ) -> StrataResult<()> {
        let mut env = task_env.clone();
        env.extend(step.options.env.clone());
        let cwd = match &step.options.cwd {
            Some(dir) => task_cwd.join(dir),
            None => task_cwd.to_path_buf(),
        };

        if let Some(condition) = &step.options.condition {
            if !self.condition_holds(condition, &cwd, &env)? {
                debug!(task = task.name(), step = index, "condition not met, skipping step");
                report.skipped.push(format!("{}[{index}]", task.name()));
                return Ok(());
            }
        }

        let label = step.options.name.as_deref().unwrap_or("");
        debug!(task = task.name(), step = index, label, "{}", step.kind);

        match &step.kind {
            StepKind::Exec(command) => {
                let outcome = self.executor.execute(&CommandSpec {
                    command: command.clone(),
                    cwd,
                    env,
                })?;
                if !outcome.success() {
                    return Err(ApplicationError::StepFailed {
                        task: task.name().into(),
                        step: index,
                        command: command.clone(),
                        exit_code: outcome.exit_code,
                        chain: chain.join(" -> "),
                    }
                    .into());
                }
            }
            StepKind::Spawn(target) => {
                return self.run_task(registry, target, &env, options, chain, report);
            }
            StepKind::Builtin(name) => {
                let builtin = self
                    .builtins
                    .get(name)
                    .ok_or_else(|| ApplicationError::UnknownBuiltin {
                        task: task.name().into(),
                        name: name.clone(),
                    })?;
                let ctx = BuiltinContext {
                    task: task.name(),
                    cwd: &cwd,
                    env: &env,
                };
                builtin
                    .run(&ctx)
                    .map_err(|reason| ApplicationError::BuiltinFailed {
                        task: task.name().into(),
                        name: name.clone(),
                        reason,
                    })?;
            }
            StepKind::Say(message) => {
                info!(task = task.name(), "{message}");
            }
        }

        report.executed.push(ExecutedStep {
            task: task.name().into(),
            step: index,
            kind: step.kind.clone(),
        });
        Ok(())
    }

    fn condition_holds(
        &self,
        condition: &str,
        cwd: &Path,
        env: &BTreeMap<String, String>,
    ) -> StrataResult<bool> {
        let outcome = self.executor.execute(&CommandSpec {
            command: condition.into(),
            cwd: cwd.to_path_buf(),
            env: env.clone(),
        })?;
        Ok(outcome.success())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::application::ports::CommandOutcome;
    use crate::domain::{StepOptions, TaskOptions, TaskState};
    use crate::error::StrataError;

    /// Records every command; fails the ones listed in `failing`.
    #[derive(Clone, Default)]
    struct FakeExecutor {
        calls: Arc<Mutex<Vec<CommandSpec>>>,
        failing: Vec<&'static str>,
    }

    impl FakeExecutor {
        fn commands(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|c| c.command.clone()).collect()
        }
    }

    impl CommandExecutor for FakeExecutor {
        fn execute(&self, spec: &CommandSpec) -> StrataResult<CommandOutcome> {
            self.calls.lock().unwrap().push(spec.clone());
            let code = if self.failing.contains(&spec.command.as_str()) { 1 } else { 0 };
            Ok(CommandOutcome {
                exit_code: Some(code),
            })
        }
    }

    fn runner(exec: &FakeExecutor) -> TaskRunner {
        TaskRunner::new(Box::new(exec.clone()))
    }

    #[test]
    fn spawn_runs_inline_between_steps() {
        let mut reg = TaskRegistry::new();
        reg.add_task("a", TaskOptions::default()).unwrap().exec("A").unwrap();
        reg.add_task("main", TaskOptions::default())
            .unwrap()
            .exec("1")
            .unwrap()
            .spawn("a")
            .unwrap()
            .exec("2")
            .unwrap();

        let exec = FakeExecutor::default();
        let report = runner(&exec).run(&mut reg, "main", &RunOptions::new("/repo")).unwrap();

        assert_eq!(exec.commands(), ["1", "A", "2"]);
        assert_eq!(report.executed.len(), 3);
        assert_eq!(reg.task("a").unwrap().state(), TaskState::Resolved);
    }

    #[test]
    fn cycle_is_rejected_before_any_step_runs() {
        let mut reg = TaskRegistry::new();
        reg.add_task("build", TaskOptions::default())
            .unwrap()
            .exec("echo build")
            .unwrap()
            .spawn("compile")
            .unwrap();
        reg.add_task("compile", TaskOptions::default())
            .unwrap()
            .exec("echo compile")
            .unwrap()
            .spawn("build")
            .unwrap();

        let exec = FakeExecutor::default();
        let err = runner(&exec)
            .run(&mut reg, "build", &RunOptions::new("/repo"))
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("build") && message.contains("compile"), "{message}");
        assert!(matches!(err, StrataError::Domain(DomainError::CyclicTaskGraph { .. })));
        assert!(exec.commands().is_empty());
    }

    #[test]
    fn broken_tasks_outside_the_closure_do_not_block_a_run() {
        let mut reg = TaskRegistry::new();
        reg.add_task("build", TaskOptions::default())
            .unwrap()
            .exec("cargo build")
            .unwrap();
        reg.add_task("docs", TaskOptions::default())
            .unwrap()
            .spawn("not-yet-defined")
            .unwrap();
        reg.add_task("ping", TaskOptions::default()).unwrap().spawn("pong").unwrap();
        reg.add_task("pong", TaskOptions::default()).unwrap().spawn("ping").unwrap();

        let exec = FakeExecutor::default();
        runner(&exec).run(&mut reg, "build", &RunOptions::new("/repo")).unwrap();
        assert_eq!(exec.commands(), ["cargo build"]);
        assert_eq!(reg.task("docs").unwrap().state(), TaskState::Defined);

        let err = runner(&exec)
            .run(&mut reg, "docs", &RunOptions::new("/repo"))
            .unwrap_err();
        assert!(matches!(
            err,
            StrataError::Domain(DomainError::TaskNotFound { ref name, ref referenced_by })
                if name == "not-yet-defined" && referenced_by.as_deref() == Some("docs")
        ));
    }

    #[test]
    fn failure_aborts_spawner_and_reports_chain() {
        let mut reg = TaskRegistry::new();
        reg.add_task("test", TaskOptions::default())
            .unwrap()
            .exec("cargo test")
            .unwrap();
        reg.add_task("ci", TaskOptions::default())
            .unwrap()
            .spawn("test")
            .unwrap()
            .exec("echo never")
            .unwrap();

        let exec = FakeExecutor {
            failing: vec!["cargo test"],
            ..FakeExecutor::default()
        };
        let err = runner(&exec)
            .run(&mut reg, "ci", &RunOptions::new("/repo"))
            .unwrap_err();

        match err {
            StrataError::Application(ApplicationError::StepFailed {
                task, step, exit_code, chain, ..
            }) => {
                assert_eq!(task, "test");
                assert_eq!(step, 0);
                assert_eq!(exit_code, Some(1));
                assert_eq!(chain, "ci -> test");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(exec.commands(), ["cargo test"]);
    }

    #[test]
    fn env_and_cwd_layer_from_base_to_step() {
        let mut reg = TaskRegistry::new();
        reg.add_environment("LEVEL", "registry");
        reg.add_environment("SHARED", "registry");
        reg.add_task(
            "build",
            TaskOptions::default().with_env("LEVEL", "task").with_cwd("crates"),
        )
        .unwrap()
        .exec_with(
            "make",
            StepOptions {
                cwd: Some("core".into()),
                env: BTreeMap::from([("LEVEL".into(), "step".into())]),
                ..StepOptions::default()
            },
        )
        .unwrap();

        let exec = FakeExecutor::default();
        let options = RunOptions::new("/repo").with_env([("SHARED", "process"), ("HOME", "/home/me")]);
        runner(&exec).run(&mut reg, "build", &options).unwrap();

        let calls = exec.calls.lock().unwrap();
        let call = &calls[0];
        assert_eq!(call.cwd, PathBuf::from("/repo/crates/core"));
        assert_eq!(call.env["LEVEL"], "step");
        assert_eq!(call.env["SHARED"], "registry");
        assert_eq!(call.env["HOME"], "/home/me");
    }

    #[test]
    fn missing_required_env_fails_before_steps() {
        let mut reg = TaskRegistry::new();
        reg.add_task("publish", TaskOptions::default().requiring_env("TOKEN"))
            .unwrap()
            .exec("upload")
            .unwrap();

        let exec = FakeExecutor::default();
        let err = runner(&exec)
            .run(&mut reg, "publish", &RunOptions::new("/repo"))
            .unwrap_err();
        assert!(matches!(
            err,
            StrataError::Application(ApplicationError::MissingEnv { ref variable, .. }) if variable == "TOKEN"
        ));
        assert!(exec.commands().is_empty());
    }

    #[test]
    fn failing_conditions_skip_task_and_step() {
        let mut reg = TaskRegistry::new();
        reg.add_task("gated", TaskOptions::default().with_condition("check-gate"))
            .unwrap()
            .exec("gated-work")
            .unwrap();
        reg.add_task("main", TaskOptions::default())
            .unwrap()
            .spawn("gated")
            .unwrap()
            .exec_with(
                "optional",
                StepOptions {
                    condition: Some("check-step".into()),
                    ..StepOptions::default()
                },
            )
            .unwrap()
            .exec("always")
            .unwrap();

        let exec = FakeExecutor {
            failing: vec!["check-gate", "check-step"],
            ..FakeExecutor::default()
        };
        let report = runner(&exec).run(&mut reg, "main", &RunOptions::new("/repo")).unwrap();

        assert_eq!(exec.commands(), ["check-gate", "check-step", "always"]);
        assert_eq!(report.skipped, ["gated", "main[1]"]);
    }

    #[test]
    fn builtins_and_messages() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let mut reg = TaskRegistry::new();
        reg.add_task("docs", TaskOptions::default())
            .unwrap()
            .say("building docs")
            .unwrap()
            .builtin("render")
            .unwrap();

        let exec = FakeExecutor::default();
        let runner = runner(&exec).with_builtin("render", move |ctx: &BuiltinContext<'_>| -> Result<(), String> {
            sink.lock().unwrap().push(ctx.task.to_string());
            Ok(())
        });
        let report = runner.run(&mut reg, "docs", &RunOptions::new("/repo")).unwrap();

        assert_eq!(*seen.lock().unwrap(), ["docs"]);
        assert_eq!(report.executed.len(), 2);
        assert!(exec.commands().is_empty());
    }

    #[test]
    fn unknown_builtin_and_task_are_reported() {
        let mut reg = TaskRegistry::new();
        reg.add_task("docs", TaskOptions::default())
            .unwrap()
            .builtin("nope")
            .unwrap();

        let exec = FakeExecutor::default();
        let err = runner(&exec)
            .run(&mut reg, "docs", &RunOptions::new("/repo"))
            .unwrap_err();
        assert!(matches!(
            err,
            StrataError::Application(ApplicationError::UnknownBuiltin { .. })
        ));

        let err = runner(&exec)
            .run(&mut reg, "missing", &RunOptions::new("/repo"))
            .unwrap_err();
        assert!(matches!(err, StrataError::Domain(DomainError::TaskNotFound { .. })));
    }
}
