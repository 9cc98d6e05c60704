//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! output for later assertion.
//!
//! # Example
//!
//! ```
//! use dotrun::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.progress("- Checking dependencies in package.json ... up to date");
//! ui.error("[ `yarn` exited with an error status ]");
//!
//! assert_eq!(ui.progresses().len(), 1);
//! assert!(ui.errors()[0].contains("error status"));
//! ```

use super::UserInterface;

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    infos: Vec<String>,
    progresses: Vec<String>,
    errors: Vec<String>,
}

impl MockUI {
    /// Create a new MockUI.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn infos(&self) -> &[String] {
        &self.infos
    }

    pub fn progresses(&self) -> &[String] {
        &self.progresses
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Check whether any captured line of any kind contains `needle`.
    pub fn has_output(&self, needle: &str) -> bool {
        [&self.infos, &self.progresses, &self.errors]
            .iter()
            .any(|lines| lines.iter().any(|line| line.contains(needle)))
    }
}

impl UserInterface for MockUI {
    fn info(&mut self, msg: &str) {
        self.infos.push(msg.to_string());
    }

    fn progress(&mut self, msg: &str) {
        self.progresses.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }
}
