//! `strata synth` — bring the project's files in line with strata.toml.

use std::path::Path;

use serde_json::json;
use tracing::{info, instrument};

use strata_adapters::{LocalFilesystem, ManifestLoader};
use strata_core::application::{SynthOptions, SynthReport, SynthService};

use crate::{
    cli::{GlobalArgs, SynthArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

pub fn execute(
    args: SynthArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let dir = global.project_dir()?;
    let options = SynthOptions {
        force: args.force || config.synth.force,
        post_synthesize: !args.no_post && config.synth.post_synthesize,
    };

    let report = synthesize(&dir, &config, options)?;

    if output.is_json() {
        output.json(&json!({
            "written": report.written,
            "unchanged": report.unchanged,
            "skipped": report.skipped,
            "removed": report.removed,
            "pruned": report.pruned,
        }))?;
        return Ok(());
    }

    for path in &report.written {
        output.print(&format!("  wrote   {}", relative(&dir, path)))?;
    }
    for path in &report.removed {
        output.print(&format!("  removed {}", relative(&dir, path)))?;
    }
    output.success(&format!(
        "Synthesized: {} written, {} unchanged, {} removed",
        report.written.len(),
        report.unchanged.len(),
        report.removed.len(),
    ))?;
    Ok(())
}

/// Load the manifest in `dir` and run one synthesis pass.
#[instrument(skip(config))]
pub fn synthesize(dir: &Path, config: &AppConfig, options: SynthOptions) -> CliResult<SynthReport> {
    let loader = ManifestLoader::new(dir.join(&config.project.manifest));
    if !loader.path().is_file() {
        return Err(CliError::ManifestNotFound {
            path: loader.path().to_path_buf(),
        });
    }

    let mut tree = loader.load_tree()?;
    info!(projects = tree.projects().count(), "manifest loaded");

    let report = SynthService::new(Box::new(LocalFilesystem::new()))
        .with_options(options)
        .synth(&mut tree)?;
    Ok(report)
}

fn relative(dir: &Path, path: &Path) -> String {
    path.strip_prefix(dir).unwrap_or(path).display().to_string()
}
