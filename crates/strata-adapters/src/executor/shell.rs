//! Shell command executor using std::process.

use std::process::Command;

use tracing::debug;

use strata_core::{
    application::{
        ApplicationError,
        ports::{CommandExecutor, CommandOutcome, CommandSpec},
    },
    error::StrataResult,
};

/// Runs commands through the platform shell, inheriting stdio.
///
/// The child gets exactly the environment in the [`CommandSpec`]; nothing is
/// inherited implicitly.
#[derive(Debug, Clone, Default)]
pub struct ShellExecutor;

impl ShellExecutor {
    pub fn new() -> Self {
        Self
    }

    fn command(line: &str) -> Command {
        if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", line]);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.args(["-c", line]);
            cmd
        }
    }
}

impl CommandExecutor for ShellExecutor {
    fn execute(&self, spec: &CommandSpec) -> StrataResult<CommandOutcome> {
        debug!(command = %spec.command, cwd = %spec.cwd.display(), "spawning");

        let status = Self::command(&spec.command)
            .current_dir(&spec.cwd)
            .env_clear()
            .envs(&spec.env)
            .status()
            .map_err(|e| ApplicationError::CommandSpawnFailed {
                command: spec.command.clone(),
                reason: format!("{} (cwd: {})", e, spec.cwd.display()),
            })?;

        Ok(CommandOutcome {
            exit_code: status.code(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use tempfile::TempDir;

    fn spec(command: &str, cwd: &std::path::Path) -> CommandSpec {
        CommandSpec {
            command: command.into(),
            cwd: cwd.to_path_buf(),
            env: BTreeMap::from([("PATH".into(), "/usr/bin:/bin".into())]),
        }
    }

    #[test]
    fn exit_codes_are_reported() {
        let dir = TempDir::new().unwrap();
        let exec = ShellExecutor::new();
        assert!(exec.execute(&spec("true", dir.path())).unwrap().success());
        assert_eq!(
            exec.execute(&spec("exit 7", dir.path())).unwrap().exit_code,
            Some(7)
        );
    }

    #[test]
    fn runs_in_cwd_with_given_env() {
        let dir = TempDir::new().unwrap();
        let mut s = spec("printf %s \"$GREETING\" > out.txt", dir.path());
        s.env.insert("GREETING".into(), "hello".into());

        ShellExecutor::new().execute(&s).unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("out.txt")).unwrap(), "hello");
    }

    #[test]
    fn missing_cwd_fails_to_start() {
        let dir = TempDir::new().unwrap();
        let err = ShellExecutor::new()
            .execute(&spec("true", &dir.path().join("absent")))
            .unwrap_err();
        assert!(err.to_string().contains("failed to start"));
    }
}
