//! Terminal UI.

use console::Term;
use std::io::Write;

use super::{should_use_colors, DotrunTheme, OutputMode, UserInterface};

/// Terminal UI implementation.
pub struct TerminalUI {
    term: Term,
    theme: DotrunTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a new terminal UI, colored when the terminal supports it.
    pub fn new(mode: OutputMode) -> Self {
        Self::with_colors(mode, should_use_colors())
    }

    /// Create a terminal UI with colors explicitly on or off.
    pub fn with_colors(mode: OutputMode, colors: bool) -> Self {
        let theme = if colors {
            DotrunTheme::new()
        } else {
            DotrunTheme::plain()
        };

        Self {
            term: Term::stdout(),
            theme,
            mode,
        }
    }
}

impl UserInterface for TerminalUI {
    fn info(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_info(msg)).ok();
        }
    }

    fn progress(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_progress(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.term, "{}", self.theme.format_error(msg)).ok();
    }
}
