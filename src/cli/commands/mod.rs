//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which opens the
//! project and routes CLI subcommands to their implementations. `exec` and
//! `run` reconcile dependencies before starting the user's command unless
//! `--skip-install` is given.

pub mod clean;
pub mod completions;
pub mod dispatcher;
pub mod exec;
pub mod install;
pub mod run;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
