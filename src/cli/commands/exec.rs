//! Exec command implementation.
//!
//! The `dotrun exec` command runs an arbitrary command in the project
//! environment, installing changed dependencies first.

use crate::cli::args::ExecArgs;
use crate::error::Result;
use crate::project::Project;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::install::install_before_command;

/// The exec command implementation.
pub struct ExecCommand {
    project: Project,
    args: ExecArgs,
    skip_install: bool,
}

impl ExecCommand {
    /// Create a new exec command.
    pub fn new(project: Project, args: ExecArgs, skip_install: bool) -> Self {
        Self {
            project,
            args,
            skip_install,
        }
    }
}

impl Command for ExecCommand {
    fn execute(&mut self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if !install_before_command(&mut self.project, self.skip_install, ui)? {
            return Ok(CommandResult::success());
        }

        let outcome = self.project.exec(&self.args.command, ui)?;
        Ok(CommandResult::from_outcome(outcome))
    }
}
