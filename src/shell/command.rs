//! Child-process execution.
//!
//! [`Executor`] is the boundary between dotrun's run policy and the OS.
//! [`SystemExecutor`] spawns real processes; tests substitute
//! [`RecordingExecutor`](super::RecordingExecutor).

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

use super::interrupt;
use crate::error::{DotrunError, Result};

/// A fully resolved command ready to launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to run, looked up on the composed `PATH`.
    pub program: String,

    /// Arguments after the program.
    pub args: Vec<String>,

    /// Working directory.
    pub cwd: PathBuf,

    /// Complete environment for the child. Nothing else is inherited.
    pub env: BTreeMap<String, String>,
}

impl Invocation {
    /// The command as the user would type it.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How a launched process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecStatus {
    /// The process exited on its own (code is `None` if killed by a signal).
    Exited { code: Option<i32> },

    /// The operator interrupted the process.
    Interrupted,
}

/// Launches invocations and waits for them to finish.
pub trait Executor {
    /// Run `invocation` to completion.
    ///
    /// Returns an error if the process could not be started or waited on.
    fn execute(&mut self, invocation: &Invocation) -> Result<ExecStatus>;
}

/// Executor that runs real child processes with inherited stdio.
///
/// The child is polled rather than waited on, so an interrupt is noticed
/// even if the child ignores SIGINT. Such a child gets `kill_grace` to
/// exit on its own before it is killed.
#[derive(Debug, Clone, Copy)]
pub struct SystemExecutor {
    kill_grace: Duration,
}

impl Default for SystemExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemExecutor {
    /// How long an interrupted child may keep running before it is killed.
    pub const DEFAULT_KILL_GRACE: Duration = Duration::from_secs(1);

    const POLL_INTERVAL: Duration = Duration::from_millis(20);

    /// Create a new system executor.
    pub fn new() -> Self {
        Self {
            kill_grace: Self::DEFAULT_KILL_GRACE,
        }
    }

    /// Override the time an interrupted child gets before it is killed.
    pub fn with_kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }

    // Give an interrupted child `kill_grace` to finish, then kill it.
    fn stop(&self, child: &mut Child) -> std::io::Result<()> {
        let deadline = Instant::now() + self.kill_grace;
        while Instant::now() < deadline {
            if child.try_wait()?.is_some() {
                return Ok(());
            }
            thread::sleep(Self::POLL_INTERVAL);
        }

        if child.try_wait()?.is_none() {
            debug!("Child {} still running after interrupt, killing it", child.id());
            child.kill()?;
        }
        child.wait().map(|_| ())
    }
}

impl Executor for SystemExecutor {
    fn execute(&mut self, invocation: &Invocation) -> Result<ExecStatus> {
        interrupt::install_handler();

        // A Ctrl+C between two children cancels the next one.
        if interrupt::take() {
            debug!(
                "Interrupt pending, not starting `{}`",
                invocation.command_line()
            );
            return Ok(ExecStatus::Interrupted);
        }

        debug!(
            "Spawning `{}` in {}",
            invocation.command_line(),
            invocation.cwd.display()
        );

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .env_clear()
            .envs(&invocation.env)
            .spawn()
            .map_err(|e| DotrunError::CommandSpawn {
                command: invocation.command_line(),
                message: e.to_string(),
            })?;

        loop {
            if let Some(status) = child.try_wait()? {
                if interrupt::take() || killed_by_interrupt(&status) {
                    return Ok(ExecStatus::Interrupted);
                }
                return Ok(ExecStatus::Exited {
                    code: status.code(),
                });
            }

            if interrupt::take() {
                self.stop(&mut child)?;
                return Ok(ExecStatus::Interrupted);
            }

            thread::sleep(Self::POLL_INTERVAL);
        }
    }
}

#[cfg(unix)]
fn killed_by_interrupt(status: &ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;
    status.signal() == Some(libc::SIGINT)
}

#[cfg(not(unix))]
fn killed_by_interrupt(_status: &ExitStatus) -> bool {
    false
}
