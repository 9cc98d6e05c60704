//! Clean command implementation.

use crate::error::Result;
use crate::project::Project;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The clean command implementation.
pub struct CleanCommand {
    project: Project,
}

impl CleanCommand {
    /// Create a new clean command.
    pub fn new(project: Project) -> Self {
        Self { project }
    }
}

impl Command for CleanCommand {
    fn execute(&mut self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        self.project.clean(ui)?;
        Ok(CommandResult::success())
    }
}
