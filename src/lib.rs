//! dotrun - dependency-aware command runner for web projects.
//!
//! dotrun keeps a project's Node (yarn), Python (pip in a virtualenv) and
//! Ruby (bundler) dependencies installed, and only reinstalls an ecosystem
//! when its fingerprint changes. Commands then run inside the project's
//! environment: `.env` files, extra variables, the virtualenv and the
//! bundler path are all composed into the child's environment.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`environment`] - Child process environment composition
//! - [`error`] - Error types and result aliases
//! - [`installers`] - Change detection and installation per ecosystem
//! - [`project`] - The project orchestrator
//! - [`shell`] - Child process execution and interrupt handling
//! - [`state`] - The `.dotrun.json` state file
//! - [`ui`] - Terminal output
//!
//! # Example
//!
//! ```
//! use dotrun::project::{Project, ProjectOptions};
//! use dotrun::shell::RecordingExecutor;
//! use dotrun::ui::MockUI;
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(dir.path().join("package.json"), r#"{"dependencies": {}}"#).unwrap();
//!
//! let exec = RecordingExecutor::new();
//! let mut project =
//!     Project::open(ProjectOptions::new(dir.path()), Box::new(exec.clone())).unwrap();
//! let mut ui = MockUI::new();
//!
//! project.install(false, &mut ui).unwrap();
//! project.install(false, &mut ui).unwrap();
//! assert_eq!(exec.count("yarn --no-default-rc install"), 1);
//! ```

pub mod cli;
pub mod environment;
pub mod error;
pub mod installers;
pub mod project;
pub mod shell;
pub mod state;
pub mod ui;

pub use error::{DotrunError, Result};
