//! Command execution inside the project environment.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::debug;

use super::command::{ExecStatus, Executor, Invocation};
use crate::environment::compose_environment;
use crate::error::{DotrunError, Result};
use crate::ui::UserInterface;

/// What the caller wants to happen when a command exits non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPolicy {
    /// A non-zero exit becomes [`DotrunError::CommandFailed`].
    Fatal,
    /// A non-zero exit is reported and returned as [`RunOutcome::Failed`].
    Continue,
}

/// Result of running one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The command exited with status 0.
    Success,
    /// The operator interrupted the command.
    Interrupted,
    /// The command exited non-zero (or could not start) under
    /// [`ExitPolicy::Continue`].
    Failed { code: Option<i32> },
}

/// Runs commands in the project directory with a freshly composed
/// environment for every call.
pub struct CommandRunner {
    root: PathBuf,
    venv: PathBuf,
    extra: BTreeMap<String, String>,
    executor: Box<dyn Executor>,
    interrupt_grace: Duration,
}

impl CommandRunner {
    /// Pause after an interrupt so the child can finish terminating.
    pub const DEFAULT_INTERRUPT_GRACE: Duration = Duration::from_secs(1);

    /// Create a runner for `root`.
    pub fn new(
        root: impl Into<PathBuf>,
        venv: impl Into<PathBuf>,
        extra: BTreeMap<String, String>,
        executor: Box<dyn Executor>,
    ) -> Self {
        Self {
            root: root.into(),
            venv: venv.into(),
            extra,
            executor,
            interrupt_grace: Self::DEFAULT_INTERRUPT_GRACE,
        }
    }

    /// Override the post-interrupt pause.
    pub fn with_interrupt_grace(mut self, grace: Duration) -> Self {
        self.interrupt_grace = grace;
        self
    }

    /// Build the invocation for `command` without running it.
    ///
    /// Returns the invocation and whether the venv was activated.
    pub fn prepare(&self, command: &[String]) -> Result<(Invocation, bool)> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| anyhow::anyhow!("No command given"))?;

        let base = utf8_vars(std::env::vars_os(), program);
        let composed = compose_environment(base, &self.root, &self.venv, &self.extra);

        let invocation = Invocation {
            program: program.clone(),
            args: args.to_vec(),
            cwd: self.root.clone(),
            env: composed.vars,
        };
        Ok((invocation, composed.virtual_env.is_some()))
    }

    /// Run `command` to completion or interruption.
    pub fn run(
        &mut self,
        command: &[String],
        policy: ExitPolicy,
        ui: &mut dyn UserInterface,
    ) -> Result<RunOutcome> {
        let (invocation, venv_active) = self.prepare(command)?;
        let line = invocation.command_line();

        if venv_active {
            ui.info(&format!("[ Using environment at {} ]", self.venv.display()));
        }
        ui.info(&format!("[ $ {} ]", line));

        let status = match self.executor.execute(&invocation) {
            Ok(status) => status,
            Err(e) if policy == ExitPolicy::Continue => {
                ui.error(&e.to_string());
                return Ok(RunOutcome::Failed { code: None });
            }
            Err(e) => return Err(e),
        };

        debug!("`{}` finished with {:?}", line, status);

        match status {
            ExecStatus::Exited { code: Some(0) } => Ok(RunOutcome::Success),
            ExecStatus::Interrupted => {
                ui.info(&format!("[ `{}` cancelled - exiting ]", line));
                if !self.interrupt_grace.is_zero() {
                    thread::sleep(self.interrupt_grace);
                }
                Ok(RunOutcome::Interrupted)
            }
            ExecStatus::Exited { code } => {
                ui.error(&format!("[ `{}` exited with an error status ]", line));
                match policy {
                    ExitPolicy::Fatal => Err(DotrunError::CommandFailed {
                        command: line,
                        code,
                    }),
                    ExitPolicy::Continue => Ok(RunOutcome::Failed { code }),
                }
            }
        }
    }
}

// Variables that are not valid UTF-8 cannot be composed and are left out.
fn utf8_vars(
    vars: impl IntoIterator<Item = (OsString, OsString)>,
    program: &str,
) -> Vec<(String, String)> {
    vars.into_iter()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (Ok(key), Err(_)) => {
                debug!("Not passing {} to `{}`: value is not UTF-8", key, program);
                None
            }
            (Err(key), _) => {
                debug!("Not passing {:?} to `{}`: name is not UTF-8", key, program);
                None
            }
        })
        .collect()
}

/// Turn string slices into an owned command.
pub fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}
