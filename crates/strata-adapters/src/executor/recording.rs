//! Recording executor for testing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use strata_core::{
    application::{
        ApplicationError,
        ports::{CommandExecutor, CommandOutcome, CommandSpec},
    },
    error::StrataResult,
};

/// Records every command instead of running it.
///
/// Commands exit 0 unless an exit code was scripted with
/// [`RecordingExecutor::with_exit_code`]. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingExecutor {
    calls: Arc<Mutex<Vec<CommandSpec>>>,
    exit_codes: HashMap<String, i32>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `command` exit with `code`.
    pub fn with_exit_code(mut self, command: impl Into<String>, code: i32) -> Self {
        self.exit_codes.insert(command.into(), code);
        self
    }

    /// Every command executed so far, in order.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Just the command lines.
    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.command).collect()
    }
}

impl CommandExecutor for RecordingExecutor {
    fn execute(&self, spec: &CommandSpec) -> StrataResult<CommandOutcome> {
        self.calls
            .lock()
            .map_err(|_| ApplicationError::StoreLockError)?
            .push(spec.clone());
        Ok(CommandOutcome {
            exit_code: Some(self.exit_codes.get(&spec.command).copied().unwrap_or(0)),
        })
    }
}
