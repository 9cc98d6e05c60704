//! User-facing output.
//!
//! This module provides:
//! - [`UserInterface`] trait for status output
//! - [`TerminalUI`] for the terminal
//! - [`MockUI`] for tests
//!
//! # Example
//!
//! ```
//! use dotrun::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.info("[ $ yarn --no-default-rc install ]");
//! assert_eq!(ui.infos().len(), 1);
//! ```

pub mod mock;
pub mod output;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use output::OutputMode;
pub use terminal::TerminalUI;
pub use theme::{should_use_colors, DotrunTheme};

/// Trait for user-facing output.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Display a command banner or environment notice.
    fn info(&mut self, msg: &str);

    /// Display an installer progress line.
    fn progress(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);
}
