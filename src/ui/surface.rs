//! The terminal surface the finder draws on

use super::error::Result;
use crate::finder::FinderEvent;
use ratatui::style::Style;

/// Minimal terminal I/O consumed by the finder
///
/// Coordinates are `(row, col)`, zero-based from the top-left corner. Writes
/// outside the surface are clipped, never an error.
pub trait Surface {
    /// Current size as `(rows, cols)`
    ///
    /// # Errors
    ///
    /// Returns `UiError` if the size cannot be queried.
    fn size(&self) -> Result<(u16, u16)>;

    /// Write `text` at `(row, col)`, truncated or padded with blanks to
    /// `width` cells, every cell in `style`
    ///
    /// # Errors
    ///
    /// Returns `UiError` if drawing fails.
    fn write(&mut self, row: u16, col: u16, text: &str, width: u16, style: Style) -> Result<()>;

    /// Place the hardware cursor
    ///
    /// # Errors
    ///
    /// Returns `UiError` if the cursor cannot be moved.
    fn move_cursor(&mut self, row: u16, col: u16) -> Result<()>;

    /// Push pending output to the terminal
    ///
    /// # Errors
    ///
    /// Returns `UiError` if flushing fails.
    fn flush(&mut self) -> Result<()>;

    /// Block until the next decoded input event
    ///
    /// Raw input that maps to no event is skipped. A resize is always
    /// reported, and the surface already has the new size when it is.
    ///
    /// # Errors
    ///
    /// Returns `UiError` if reading input fails.
    fn next_event(&mut self) -> Result<FinderEvent>;
}
