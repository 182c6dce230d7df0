//! Color theme for the finder
//!
//! Defines the colors and styles of the three screen regions: the input
//! line, the status line and the result rows.

use super::output::MessageLevel;
use ratatui::style::{Color, Modifier, Style};

/// Theme configuration for the finder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Color of the selection pointer
    pub pointer: Color,
    /// Color of the prompt in front of the query
    pub prompt: Color,
    /// Color for the result count
    pub status: Color,
    /// Color for error messages
    pub error: Color,
    /// Color for warning messages
    pub warning: Color,
    /// Color for success messages
    pub success: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Create a dark theme (default)
    #[must_use]
    pub const fn dark() -> Self {
        Self {
            pointer: Color::Blue,
            prompt: Color::Cyan,
            status: Color::DarkGray,
            error: Color::Red,
            warning: Color::Yellow,
            success: Color::Green,
        }
    }

    /// Theme without colors, for terminals that cannot show them
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            pointer: Color::Reset,
            prompt: Color::Reset,
            status: Color::Reset,
            error: Color::Reset,
            warning: Color::Reset,
            success: Color::Reset,
        }
    }

    /// Style for the pointer glyph (>)
    #[must_use]
    pub fn pointer_style(&self) -> Style {
        Style::default().fg(self.pointer).add_modifier(Modifier::BOLD)
    }

    /// Style for result titles
    #[must_use]
    pub fn title_style(&self) -> Style {
        Style::default()
    }

    /// Style for the prompt
    #[must_use]
    pub fn prompt_style(&self) -> Style {
        Style::default().fg(self.prompt).add_modifier(Modifier::BOLD)
    }

    /// Style for the query text
    #[must_use]
    pub fn input_style(&self) -> Style {
        Style::default()
    }

    /// Style for a status line message of the given level
    #[must_use]
    pub fn message_style(&self, level: MessageLevel) -> Style {
        match level {
            MessageLevel::Error => Style::default().fg(self.error),
            MessageLevel::Warning => Style::default().fg(self.warning),
            MessageLevel::Success => Style::default().fg(self.success),
            MessageLevel::Info | MessageLevel::Normal => Style::default().fg(self.status),
        }
    }
}
