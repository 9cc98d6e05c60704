//! Command execution.
//!
//! - [`command`] - the [`Executor`] seam and the real [`SystemExecutor`]
//! - [`runner`] - [`CommandRunner`], which composes the environment, reports
//!   progress, and applies the caller's [`ExitPolicy`]
//! - [`interrupt`] - Ctrl+C tracking
//! - [`recording`] - [`RecordingExecutor`] for tests

pub mod command;
pub mod interrupt;
pub mod recording;
pub mod runner;

pub use command::{ExecStatus, Executor, Invocation, SystemExecutor};
pub use recording::{RecordingExecutor, Response};
pub use runner::{argv, CommandRunner, ExitPolicy, RunOutcome};
