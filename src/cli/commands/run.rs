//! Run command implementation.
//!
//! The `dotrun run` command runs a `package.json` script through yarn.

use crate::cli::args::RunArgs;
use crate::error::Result;
use crate::project::Project;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::install::install_before_command;

/// The run command implementation.
pub struct RunCommand {
    project: Project,
    args: RunArgs,
    skip_install: bool,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(project: Project, args: RunArgs, skip_install: bool) -> Self {
        Self {
            project,
            args,
            skip_install,
        }
    }
}

impl Command for RunCommand {
    fn execute(&mut self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if !install_before_command(&mut self.project, self.skip_install, ui)? {
            return Ok(CommandResult::success());
        }

        let outcome = self
            .project
            .run_script(&self.args.script, &self.args.args, ui)?;
        Ok(CommandResult::from_outcome(outcome))
    }
}
