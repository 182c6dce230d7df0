//! Mock terminal surface for testing
//!
//! Draws into a ratatui [`Buffer`] and records every write, so tests can
//! check both what ends up on screen and how much was redrawn.

use super::error::{Result, UiError};
use super::surface::Surface;
use crate::finder::FinderEvent;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use std::collections::VecDeque;

/// One recorded [`Surface::write`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedWrite {
    pub row: u16,
    pub col: u16,
    pub text: String,
    pub width: u16,
    pub style: Style,
}

/// Surface that replays scripted events
#[derive(Debug)]
pub struct MockSurface {
    buffer: Buffer,
    events: VecDeque<FinderEvent>,
    /// Every write since the last [`MockSurface::take_writes`]
    pub writes: Vec<RecordedWrite>,
    /// Last hardware cursor position as `(row, col)`
    pub cursor: Option<(u16, u16)>,
    pub flushes: usize,
    fail_writes: bool,
}

impl MockSurface {
    /// Create a blank surface of `rows` x `cols`
    #[must_use]
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            buffer: Buffer::empty(Rect::new(0, 0, cols, rows)),
            events: VecDeque::new(),
            writes: Vec::new(),
            cursor: None,
            flushes: 0,
            fail_writes: false,
        }
    }

    /// Queue events returned by [`Surface::next_event`], in order
    #[must_use]
    pub fn with_events(mut self, events: impl IntoIterator<Item = FinderEvent>) -> Self {
        self.events.extend(events);
        self
    }

    /// Make every subsequent write fail
    #[must_use]
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Text of one screen row, trailing blanks removed
    #[must_use]
    pub fn row_text(&self, row: u16) -> String {
        let area = self.buffer.area;
        let text: String = (0..area.width)
            .map(|x| self.buffer[(x, row)].symbol())
            .collect();
        text.trim_end().to_string()
    }

    /// All screen rows, trailing blanks removed
    #[must_use]
    pub fn screen(&self) -> Vec<String> {
        (0..self.buffer.area.height).map(|row| self.row_text(row)).collect()
    }

    /// Style of the cell at `(row, col)`
    #[must_use]
    pub fn style_at(&self, row: u16, col: u16) -> Style {
        self.buffer[(col, row)].style()
    }

    /// Drain the recorded writes
    pub fn take_writes(&mut self) -> Vec<RecordedWrite> {
        std::mem::take(&mut self.writes)
    }

    fn resize(&mut self, rows: u16, cols: u16) {
        self.buffer = Buffer::empty(Rect::new(0, 0, cols, rows));
    }
}

impl Surface for MockSurface {
    fn size(&self) -> Result<(u16, u16)> {
        Ok((self.buffer.area.height, self.buffer.area.width))
    }

    fn write(&mut self, row: u16, col: u16, text: &str, width: u16, style: Style) -> Result<()> {
        if self.fail_writes {
            return Err(UiError::TerminalError("write failed".to_string()));
        }
        self.writes.push(RecordedWrite {
            row,
            col,
            text: text.to_string(),
            width,
            style,
        });

        let area = self.buffer.area;
        if row >= area.height || col >= area.width {
            return Ok(());
        }
        let region = Rect::new(col, row, width.min(area.width - col), 1);
        for x in region.left()..region.right() {
            self.buffer[(x, row)].reset();
        }
        self.buffer.set_style(region, style);
        self.buffer
            .set_stringn(col, row, text, usize::from(region.width), style);
        Ok(())
    }

    fn move_cursor(&mut self, row: u16, col: u16) -> Result<()> {
        self.cursor = Some((row, col));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }

    fn next_event(&mut self) -> Result<FinderEvent> {
        let event = self
            .events
            .pop_front()
            .ok_or_else(|| UiError::TerminalError("no scripted events left".to_string()))?;
        if let FinderEvent::Resize { rows, cols } = event {
            self.resize(rows, cols);
        }
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn test_write_truncates_and_pads() {
        let mut surface = MockSurface::new(2, 10);
        surface.write(0, 0, "hello world", 5, Style::default()).unwrap();
        assert_eq!(surface.row_text(0), "hello");

        surface.write(0, 0, "hi", 5, Style::default()).unwrap();
        assert_eq!(surface.row_text(0), "hi");
    }

    #[test]
    fn test_write_is_clipped() {
        let mut surface = MockSurface::new(2, 4);
        surface.write(5, 0, "away", 4, Style::default()).unwrap();
        surface.write(1, 2, "long", 10, Style::default()).unwrap();
        assert_eq!(surface.screen(), vec!["", "  lo"]);
        assert_eq!(surface.writes.len(), 2);
    }

    #[test]
    fn test_style_recorded() {
        let mut surface = MockSurface::new(1, 4);
        let style = Style::default().fg(Color::Blue);
        surface.write(0, 0, ">", 1, style).unwrap();
        assert_eq!(surface.style_at(0, 0).fg, Some(Color::Blue));
    }

    #[test]
    fn test_scripted_events_then_error() {
        let mut surface = MockSurface::new(3, 10)
            .with_events([FinderEvent::Insert('a'), FinderEvent::Resize { rows: 5, cols: 20 }]);

        assert_eq!(surface.next_event().unwrap(), FinderEvent::Insert('a'));
        assert_eq!(
            surface.next_event().unwrap(),
            FinderEvent::Resize { rows: 5, cols: 20 }
        );
        assert_eq!(surface.size().unwrap(), (5, 20));
        assert!(surface.next_event().is_err());
    }

    #[test]
    fn test_failing_writes() {
        let mut surface = MockSurface::new(1, 1).failing_writes();
        assert!(surface.write(0, 0, "x", 1, Style::default()).is_err());
    }
}
