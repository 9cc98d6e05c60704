//! Install command implementation.
//!
//! The `dotrun install` command reconciles every ecosystem once.

use tracing::debug;

use crate::cli::args::InstallArgs;
use crate::error::Result;
use crate::project::Project;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The install command implementation.
pub struct InstallCommand {
    project: Project,
    args: InstallArgs,
}

impl InstallCommand {
    /// Create a new install command.
    pub fn new(project: Project, args: InstallArgs) -> Self {
        Self { project, args }
    }
}

impl Command for InstallCommand {
    fn execute(&mut self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let report = self.project.install(self.args.force, ui)?;
        debug!("Install report: {:?}", report);
        Ok(CommandResult::success())
    }
}

/// Install dependencies ahead of a user command.
///
/// Returns `false` when the install was interrupted and the command should
/// not run.
pub(super) fn install_before_command(
    project: &mut Project,
    skip_install: bool,
    ui: &mut dyn UserInterface,
) -> Result<bool> {
    if skip_install {
        return Ok(true);
    }

    let report = project.install(false, ui)?;
    Ok(!report.interrupted())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectOptions;
    use crate::shell::{RecordingExecutor, Response};
    use crate::ui::MockUI;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn open(temp: &TempDir, exec: &RecordingExecutor) -> Project {
        fs::write(temp.path().join("package.json"), r#"{"dependencies": {}}"#).unwrap();
        Project::open(ProjectOptions::new(temp.path()), Box::new(exec.clone()))
            .unwrap()
            .with_interrupt_grace(Duration::ZERO)
    }

    #[test]
    fn force_reinstalls_unchanged_dependencies() {
        let temp = TempDir::new().unwrap();
        let exec = RecordingExecutor::new();
        let mut ui = MockUI::new();

        let mut cmd = InstallCommand::new(open(&temp, &exec), InstallArgs::default());
        cmd.execute(&mut ui).unwrap();
        cmd.execute(&mut ui).unwrap();
        assert_eq!(exec.count("yarn --no-default-rc install"), 1);

        let mut cmd = InstallCommand::new(open(&temp, &exec), InstallArgs { force: true });
        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert_eq!(exec.count("yarn --no-default-rc install"), 2);
    }

    #[test]
    fn install_failure_is_an_error() {
        let temp = TempDir::new().unwrap();
        let exec = RecordingExecutor::new();
        exec.respond("yarn", Response::Fail(1));
        let mut ui = MockUI::new();

        let mut cmd = InstallCommand::new(open(&temp, &exec), InstallArgs::default());

        assert!(cmd.execute(&mut ui).is_err());
    }

    #[test]
    fn skip_install_runs_nothing() {
        let temp = TempDir::new().unwrap();
        let exec = RecordingExecutor::new();
        let mut project = open(&temp, &exec);
        let mut ui = MockUI::new();

        assert!(install_before_command(&mut project, true, &mut ui).unwrap());
        assert!(exec.invocations().is_empty());
    }

    #[test]
    fn interrupted_install_blocks_the_command() {
        let temp = TempDir::new().unwrap();
        let exec = RecordingExecutor::new();
        exec.respond("yarn --no-default-rc install", Response::Interrupt);
        let mut project = open(&temp, &exec);
        let mut ui = MockUI::new();

        assert!(!install_before_command(&mut project, false, &mut ui).unwrap());
    }
}
