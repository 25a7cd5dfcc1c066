//! Cell styles and the visual roles the dashboard uses.
//!
//! Only roles are fixed; the concrete colors are presentation choices.

pub use crossterm::style::Color;

/// Display style for one terminal cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    /// Foreground color, terminal default when unset.
    pub fg: Option<Color>,
    /// Background color, terminal default when unset.
    pub bg: Option<Color>,
    /// Bold attribute.
    pub bold: bool,
}

impl Style {
    /// The terminal's default style.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            bold: false,
        }
    }

    /// Sets the foreground color.
    #[must_use]
    pub const fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    /// Sets the background color.
    #[must_use]
    pub const fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    /// Sets the bold attribute.
    #[must_use]
    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// Style roles used across the dashboard.
pub mod role {
    use super::{Color, Style};

    /// Window borders.
    pub const BORDER: Style = Style::new().fg(Color::DarkYellow);

    /// The rule under the table header.
    pub const TABLE_RULE: Style = Style::new().fg(Color::Magenta);

    /// Section separators on the inspect screen.
    pub const INSPECT_RULE: Style = Style::new().fg(Color::Green);

    /// Background override for the focused row.
    pub const FOCUS: Style = Style::new().bg(Color::DarkBlue);

    /// The `/` marker in front of the search box.
    pub const SEARCH_ACCENT: Style = Style::new().fg(Color::Yellow);

    /// The search box cursor cell.
    pub const CURSOR: Style = Style::new().fg(Color::Black).bg(Color::White);

    /// Filled portion of percentage and value bars.
    pub const BAR_FILL: Style = Style::new().bg(Color::DarkCyan);

    /// Status-bar warnings.
    pub const WARNING: Style = Style::new().fg(Color::Yellow);

    /// Status-bar errors.
    pub const ERROR: Style = Style::new().fg(Color::Red).bold();
}
