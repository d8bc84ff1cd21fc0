//! `strata init` — write a starter strata.toml.

use strata_adapters::manifest_loader::parse_manifest;

use crate::{
    cli::{GlobalArgs, InitArgs},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

const STARTER: &str = r##"[project]
name = "{name}"
gitignore = ["/target", "*.log"]

[[files]]
path = "README.md"
type = "sample"
contents = "# {name}\n"

[tasks.build]
description = "Build the project"
steps = [{ say = "nothing to build yet" }]

[tasks.default]
description = "Synthesize project files"
steps = [{ builtin = "strata:synth" }]
"##;

/// Create a starter manifest in the project directory.
pub fn execute(
    args: InitArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let dir = global.project_dir()?;
    let path = dir.join(&config.project.manifest);

    // Bail early if the file already exists and --force was not given.
    if path.exists() && !args.force {
        output.warning(&format!(
            "{} already exists  (use --force to overwrite)",
            path.display(),
        ))?;
        return Ok(());
    }

    let name = args
        .name
        .or_else(|| dir.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "project".into());
    let manifest = starter_manifest(&name)?;

    std::fs::create_dir_all(&dir)
        .with_cli_context(|| format!("Failed to create '{}'", dir.display()))?;
    std::fs::write(&path, manifest)
        .with_cli_context(|| format!("Failed to write '{}'", path.display()))?;

    output.success(&format!("Created {}", path.display()))?;
    output.info("Run 'strata synth' to generate project files")?;
    Ok(())
}

/// Render the starter manifest for `name`, checking that it parses.
fn starter_manifest(name: &str) -> CliResult<String> {
    if name.contains(['"', '\\', '\n']) {
        return Err(CliError::InvalidInput {
            message: format!("project name '{name}' cannot contain quotes, backslashes or newlines"),
            source: None,
        });
    }
    let manifest = STARTER.replace("{name}", name);
    parse_manifest(&manifest)?;
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_manifest_parses() {
        let manifest = starter_manifest("demo").unwrap();
        let parsed = parse_manifest(&manifest).unwrap();
        assert_eq!(parsed.project.name, "demo");
        assert!(parsed.body.tasks.contains_key("default"));
    }

    #[test]
    fn quotes_in_name_are_rejected() {
        assert!(matches!(
            starter_manifest("bad\"name"),
            Err(CliError::InvalidInput { .. })
        ));
    }
}
