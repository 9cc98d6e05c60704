//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use crate::cli::args::{Cli, Commands, RunArgs};
use crate::error::Result;
use crate::project::{Project, ProjectOptions};
use crate::shell::{Executor, RunOutcome, SystemExecutor};
use crate::ui::UserInterface;

use super::clean::CleanCommand;
use super::completions::CompletionsCommand;
use super::exec::ExecCommand;
use super::install::InstallCommand;
use super::run::RunCommand;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&mut self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }

    /// Map a child process outcome. An interrupt is not a failure.
    pub fn from_outcome(outcome: RunOutcome) -> Self {
        match outcome {
            RunOutcome::Success | RunOutcome::Interrupted => Self::success(),
            RunOutcome::Failed { code } => Self::failure(code.filter(|c| *c != 0).unwrap_or(1)),
        }
    }
}

type ExecutorFactory = Box<dyn Fn() -> Box<dyn Executor>>;

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    options: ProjectOptions,
    skip_install: bool,
    executor: ExecutorFactory,
}

impl CommandDispatcher {
    /// Create a dispatcher that runs real processes for the given project.
    pub fn new(options: ProjectOptions) -> Self {
        Self {
            options,
            skip_install: false,
            executor: Box::new(|| Box::new(SystemExecutor::new())),
        }
    }

    /// Build a dispatcher from the global CLI options.
    ///
    /// The project root is `--project` if given, the current directory otherwise.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let root = match &cli.project {
            Some(path) => path.clone(),
            None => std::env::current_dir()?,
        };

        let options = ProjectOptions::new(root)
            .envs(cli.env.iter().cloned())
            .platform_revision(cli.platform_revision.clone());

        Ok(Self::new(options).skip_install(cli.skip_install))
    }

    /// Skip the dependency check before `exec` and `run`.
    pub fn skip_install(mut self, skip: bool) -> Self {
        self.skip_install = skip;
        self
    }

    /// Use a different executor for child processes.
    pub fn with_executor<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Executor> + 'static,
    {
        self.executor = Box::new(factory);
        self
    }

    pub fn options(&self) -> &ProjectOptions {
        &self.options
    }

    fn open(&self) -> Result<Project> {
        Project::open(self.options.clone(), (self.executor)())
    }

    /// Dispatch and execute a command.
    ///
    /// With no subcommand, runs the project's `start` script.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Some(Commands::Install(args)) => {
                InstallCommand::new(self.open()?, args.clone()).execute(ui)
            }
            Some(Commands::Exec(args)) => {
                ExecCommand::new(self.open()?, args.clone(), self.skip_install).execute(ui)
            }
            Some(Commands::Run(args)) => {
                RunCommand::new(self.open()?, args.clone(), self.skip_install).execute(ui)
            }
            Some(Commands::Clean) => CleanCommand::new(self.open()?).execute(ui),
            Some(Commands::Completions(args)) => {
                CompletionsCommand::new(args.clone()).execute(ui)
            }
            None => RunCommand::new(self.open()?, RunArgs::default(), self.skip_install)
                .execute(ui),
        }
    }
}
