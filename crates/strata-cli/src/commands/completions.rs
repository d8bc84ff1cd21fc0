//! Shell completion generation.

use clap::CommandFactory;
use clap_complete::{Generator, generate, shells};

use crate::cli::{Cli, CompletionsArgs, Shell};

const BIN_NAME: &str = "strata";

pub fn execute(args: CompletionsArgs) -> crate::error::CliResult<()> {
    match args.shell {
        Shell::Bash => print(shells::Bash),
        Shell::Zsh => print(shells::Zsh),
        Shell::Fish => print(shells::Fish),
        Shell::PowerShell => print(shells::PowerShell),
        Shell::Elvish => print(shells::Elvish),
    }
    Ok(())
}

fn print(shell: impl Generator) {
    generate(shell, &mut Cli::command(), BIN_NAME, &mut std::io::stdout());
}
