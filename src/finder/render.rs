//! Redraw policy
//!
//! A [`Damage`] names the stale parts of the screen. The [`Renderer`]
//! repaints only those: on plain up/down motion that is two pointer cells.

use super::state::{HEADER_ROWS, SearchState};
use crate::ui::{MessageLevel, Result, Surface, Theme, UiError};
use std::borrow::Cow;
use unicode_width::UnicodeWidthChar;

/// Default prompt in front of the query
pub const DEFAULT_PROMPT: &str = "> ";
/// Default selection pointer
pub const DEFAULT_POINTER: &str = ">";

const INPUT_ROW: u16 = 0;
const STATUS_ROW: u16 = 1;

/// Pointer glyph moving between two result indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerMove {
    pub from: usize,
    pub to: usize,
}

/// Parts of the screen to repaint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Damage {
    /// Status line and every result row
    pub full: bool,
    /// Pointer glyph only; ignored when `full` is set
    pub pointer: Option<PointerMove>,
    /// Input line
    pub input: bool,
}

impl Damage {
    /// Everything
    #[must_use]
    pub const fn all() -> Self {
        Self {
            full: true,
            pointer: None,
            input: true,
        }
    }

    /// Status line and result rows
    #[must_use]
    pub const fn results() -> Self {
        Self {
            full: true,
            pointer: None,
            input: false,
        }
    }

    /// Input line only
    #[must_use]
    pub const fn input() -> Self {
        Self {
            full: false,
            pointer: None,
            input: true,
        }
    }

    #[must_use]
    pub const fn pointer(from: usize, to: usize) -> Self {
        Self {
            full: false,
            pointer: Some(PointerMove { from, to }),
            input: false,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.full && !self.input && self.pointer.is_none()
    }
}

/// Draws a [`SearchState`] onto a [`Surface`]
#[derive(Debug, Clone)]
pub struct Renderer {
    theme: Theme,
    prompt: String,
    pointer: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            prompt: DEFAULT_PROMPT.to_string(),
            pointer: DEFAULT_POINTER.to_string(),
        }
    }
}

impl Renderer {
    /// # Errors
    ///
    /// Returns `UiError::InvalidConfig` if `pointer` is empty.
    pub fn new(theme: Theme, prompt: impl Into<String>, pointer: impl Into<String>) -> Result<Self> {
        let pointer = pointer.into();
        if pointer.is_empty() {
            return Err(UiError::InvalidConfig("pointer must not be empty".to_string()));
        }
        Ok(Self {
            theme,
            prompt: prompt.into(),
            pointer,
        })
    }

    /// Repaint `damage`, then park the cursor in the input line and flush
    ///
    /// # Errors
    ///
    /// Returns `UiError` if any surface call fails.
    pub fn draw<S>(&self, surface: &mut S, state: &SearchState, damage: &Damage) -> Result<()>
    where
        S: Surface + ?Sized,
    {
        let (_, cols) = surface.size()?;

        if damage.input {
            self.draw_input(surface, state, cols)?;
        }
        if damage.full {
            self.draw_status(surface, state, cols)?;
            self.draw_results(surface, state, cols)?;
        } else if let Some(PointerMove { from, to }) = damage.pointer {
            self.draw_pointer(surface, state, from, false)?;
            self.draw_pointer(surface, state, to, true)?;
        }

        let prompt_width = text_width(&self.prompt);
        let column = prompt_width.saturating_add(cursor_column(state));
        surface.move_cursor(INPUT_ROW, column.min(cols.saturating_sub(1)))?;
        surface.flush()
    }

    fn draw_input<S>(&self, surface: &mut S, state: &SearchState, cols: u16) -> Result<()>
    where
        S: Surface + ?Sized,
    {
        let prompt_width = text_width(&self.prompt).min(cols);
        surface.write(INPUT_ROW, 0, &self.prompt, prompt_width, self.theme.prompt_style())?;
        surface.write(
            INPUT_ROW,
            prompt_width,
            &displayed(state.buffer()),
            cols - prompt_width,
            self.theme.input_style(),
        )
    }

    fn draw_status<S>(&self, surface: &mut S, state: &SearchState, cols: u16) -> Result<()>
    where
        S: Surface + ?Sized,
    {
        match state.status() {
            Some(status) => surface.write(
                STATUS_ROW,
                0,
                &status.text,
                cols,
                self.theme.message_style(status.level),
            ),
            None => {
                let count = state.results().len();
                let text = if count == 1 {
                    "1 note".to_string()
                } else {
                    format!("{count} notes")
                };
                let style = self.theme.message_style(MessageLevel::Info);
                surface.write(STATUS_ROW, 0, &text, cols, style)
            }
        }
    }

    fn draw_results<S>(&self, surface: &mut S, state: &SearchState, cols: u16) -> Result<()>
    where
        S: Surface + ?Sized,
    {
        let gutter = self.gutter_width();
        for slot in 0..state.visible_rows() {
            let row = HEADER_ROWS.saturating_add(to_u16(slot));
            let index = state.viewport_start() + slot;
            match state.results().get(index) {
                Some(hit) => {
                    self.write_pointer(surface, row, state.selection() == Some(index))?;
                    surface.write(
                        row,
                        gutter,
                        &hit.title,
                        cols.saturating_sub(gutter),
                        self.theme.title_style(),
                    )?;
                }
                None => surface.write(row, 0, "", cols, self.theme.title_style())?,
            }
        }
        Ok(())
    }

    fn draw_pointer<S>(&self, surface: &mut S, state: &SearchState, index: usize, on: bool) -> Result<()>
    where
        S: Surface + ?Sized,
    {
        let Some(slot) = index.checked_sub(state.viewport_start()) else {
            return Ok(());
        };
        if slot >= state.visible_rows() || index >= state.results().len() {
            return Ok(());
        }
        let row = HEADER_ROWS.saturating_add(to_u16(slot));
        self.write_pointer(surface, row, on)
    }

    fn write_pointer<S>(&self, surface: &mut S, row: u16, on: bool) -> Result<()>
    where
        S: Surface + ?Sized,
    {
        let glyph = if on { self.pointer.as_str() } else { "" };
        surface.write(row, 0, glyph, self.gutter_width(), self.theme.pointer_style())
    }

    /// Pointer plus one blank column
    fn gutter_width(&self) -> u16 {
        text_width(&self.pointer).saturating_add(1)
    }
}

/// Terminal cells `text` occupies
fn text_width(text: &str) -> u16 {
    to_u16(text.chars().map(cell_width).sum())
}

/// Wide characters take two cells; control characters are drawn as a blank
fn cell_width(c: char) -> usize {
    if c.is_control() { 1 } else { c.width().unwrap_or(0) }
}

/// Cells between the end of the prompt and the cursor
fn cursor_column(state: &SearchState) -> u16 {
    let before: usize = state.buffer().chars().take(state.cursor()).map(cell_width).sum();
    to_u16(before)
}

/// Query text as drawn, with control characters such as tab blanked
fn displayed(text: &str) -> Cow<'_, str> {
    if text.contains(char::is_control) {
        Cow::Owned(text.chars().map(|c| if c.is_control() { ' ' } else { c }).collect())
    } else {
        Cow::Borrowed(text)
    }
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}
