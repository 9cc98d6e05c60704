//! Visual theme and styling.

use console::Style;

/// dotrun's visual theme.
#[derive(Debug, Clone)]
pub struct DotrunTheme {
    /// Style for command banners and environment notices (cyan).
    pub info: Style,
    /// Style for installer progress lines (magenta).
    pub progress: Style,
    /// Style for error messages (red bold).
    pub error: Style,
}

impl Default for DotrunTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl DotrunTheme {
    /// Create the default theme.
    pub fn new() -> Self {
        Self {
            info: Style::new().cyan(),
            progress: Style::new().magenta(),
            error: Style::new().red().bold(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            info: Style::new(),
            progress: Style::new(),
            error: Style::new(),
        }
    }

    pub fn format_info(&self, msg: &str) -> String {
        format!("{}", self.info.apply_to(msg))
    }

    pub fn format_progress(&self, msg: &str) -> String {
        format!("{}", self.progress.apply_to(msg))
    }

    /// Format an error message (text in red bold).
    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(msg))
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}
