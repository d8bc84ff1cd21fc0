//! `strata run` — run a task through the shell.

use tracing::instrument;

use strata_adapters::ShellExecutor;
use strata_core::application::{BuiltinContext, RunOptions, SynthOptions, TaskRunner};

use crate::{
    cli::{GlobalArgs, RunArgs},
    commands::{synth::synthesize, tasks::load_registry},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// Builtin that re-runs synthesis from inside a task.
pub const SYNTH_BUILTIN: &str = "strata:synth";

#[instrument(skip_all, fields(task = %args.task))]
pub fn execute(
    args: RunArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let dir = global.project_dir()?;
    let mut registry = load_registry(&dir)?;
    registry.validate()?;

    let synth_dir = dir.clone();
    let synth_options = SynthOptions {
        force: config.synth.force,
        post_synthesize: config.synth.post_synthesize,
    };
    let runner = TaskRunner::new(Box::new(ShellExecutor::new())).with_builtin(
        SYNTH_BUILTIN,
        move |_ctx: &BuiltinContext<'_>| -> Result<(), String> {
            synthesize(&synth_dir, &config, synth_options)
                .map(|_| ())
                .map_err(|e| e.to_string())
        },
    );

    let options = RunOptions::new(&dir).with_env(std::env::vars());
    let report = runner.run(&mut registry, &args.task, &options)?;

    for skipped in &report.skipped {
        output.info(&format!("skipped {skipped} (condition not met)"))?;
    }
    output.success(&format!(
        "Task '{}' finished ({} step(s))",
        args.task,
        report.executed.len()
    ))?;
    Ok(())
}
