//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "strata",
    bin_name = "strata",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Project files as code",
    long_about = "Strata keeps a project's configuration files in sync with a \
                  single declarative definition (strata.toml) and runs the \
                  project's tasks.",
    after_help = "EXAMPLES:\n\
        \x20 strata init\n\
        \x20 strata synth\n\
        \x20 strata run build\n\
        \x20 strata tasks --output-format json\n\
        \x20 strata completions bash > /usr/share/bash-completion/completions/strata",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Synthesize project files from strata.toml.
    #[command(
        visible_alias = "s",
        about = "Synthesize project files",
        after_help = "EXAMPLES:\n\
            \x20 strata synth\n\
            \x20 strata synth --force      # overwrite hand-written files\n\
            \x20 strata -C packages/api synth"
    )]
    Synth(SynthArgs),

    /// Run a task from .strata/tasks.json.
    #[command(
        about = "Run a task",
        after_help = "EXAMPLES:\n\
            \x20 strata run build\n\
            \x20 strata run ci -v"
    )]
    Run(RunArgs),

    /// List the tasks defined for this project.
    #[command(
        visible_alias = "ls",
        about = "List tasks",
        after_help = "EXAMPLES:\n\
            \x20 strata tasks\n\
            \x20 strata tasks --output-format json"
    )]
    Tasks(TasksArgs),

    /// Write a starter strata.toml.
    #[command(
        about = "Create a starter strata.toml",
        after_help = "EXAMPLES:\n\
            \x20 strata init\n\
            \x20 strata init --name my-app --force"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 strata completions bash > ~/.local/share/bash-completion/completions/strata\n\
            \x20 strata completions zsh  > ~/.zfunc/_strata\n\
            \x20 strata completions fish > ~/.config/fish/completions/strata.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the Strata configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 strata config get synth.force\n\
            \x20 strata config list\n\
            \x20 strata config path"
    )]
    Config(ConfigCommands),
}

// ── synth ─────────────────────────────────────────────────────────────────────

/// Arguments for `strata synth`.
#[derive(Debug, Args)]
pub struct SynthArgs {
    /// Overwrite files that exist but were not generated by strata.
    #[arg(short = 'f', long = "force", help = "Overwrite hand-written files")]
    pub force: bool,

    /// Skip post-synthesis hooks.
    #[arg(long = "no-post", help = "Skip post-synthesis hooks")]
    pub no_post: bool,
}

// ── run ───────────────────────────────────────────────────────────────────────

/// Arguments for `strata run`.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Task to run.
    #[arg(value_name = "TASK", help = "Name of the task to run")]
    pub task: String,
}

// ── tasks ─────────────────────────────────────────────────────────────────────

/// Arguments for `strata tasks`.
#[derive(Debug, Args)]
pub struct TasksArgs {
    /// Show each task's steps.
    #[arg(short = 's', long = "steps", help = "Show task steps")]
    pub steps: bool,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `strata init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Project name (defaults to the directory name).
    #[arg(short = 'n', long = "name", value_name = "NAME", help = "Project name")]
    pub name: Option<String>,

    /// Overwrite an existing manifest.
    #[arg(short = 'f', long = "force", help = "Overwrite an existing strata.toml")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `strata completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `strata config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `synth.force`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the default configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
