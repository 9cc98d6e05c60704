//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::project::parse_env_var;

/// dotrun - install a project's dependencies when they change, then run commands in its environment.
#[derive(Debug, Parser)]
#[command(name = "dotrun")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true, env = "DOTRUN_PROJECT")]
    pub project: Option<PathBuf>,

    /// Extra environment variable for commands, as KEY=VALUE (repeatable)
    #[arg(
        short,
        long = "env",
        global = true,
        value_name = "KEY=VALUE",
        value_parser = parse_env_arg
    )]
    pub env: Vec<(String, String)>,

    /// Platform revision the Python environment was built under
    #[arg(long, global = true, env = "SNAP_REVISION")]
    pub platform_revision: Option<String>,

    /// Do not check dependencies before running a command
    #[arg(long, global = true)]
    pub skip_install: bool,

    /// Only show errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install dependencies that changed since the last run
    Install(InstallArgs),

    /// Run a command inside the project environment
    Exec(ExecArgs),

    /// Run a package.json script (default: `start`)
    Run(RunArgs),

    /// Remove installed dependencies and dotrun state
    Clean,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `install` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct InstallArgs {
    /// Install even if nothing changed
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the `exec` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ExecArgs {
    /// Command and arguments to run
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, clap::Args)]
pub struct RunArgs {
    /// Script name from package.json
    #[arg(default_value = "start")]
    pub script: String,

    /// Extra arguments passed to the script
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            script: "start".to_string(),
            args: Vec::new(),
        }
    }
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

fn parse_env_arg(spec: &str) -> Result<(String, String), String> {
    parse_env_var(spec).map_err(|e| e.to_string())
}
