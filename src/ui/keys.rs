//! Raw crossterm events -> [`FinderEvent`]
//!
//! | Input | Event |
//! |---|---|
//! | Esc, Ctrl-C | `Cancel` |
//! | Enter | `Commit` |
//! | Up, Ctrl-P, Ctrl-K | `Up` |
//! | Down, Ctrl-N, Ctrl-J | `Down` |
//! | Left / Right | `Left` / `Right` |
//! | Backspace / Delete | `Backspace` / `Delete` |
//! | any other character, Tab | `Insert` |
//! | terminal resize | `Resize` |
//!
//! Keys without a character (F-keys, Home, End, paging) are dropped.

use crate::finder::FinderEvent;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Decode one terminal event; `None` for input the finder ignores
#[must_use]
pub fn decode(event: &Event) -> Option<FinderEvent> {
    match event {
        Event::Key(key) if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) => {
            decode_key(key)
        }
        Event::Resize(cols, rows) => Some(FinderEvent::Resize {
            rows: *rows,
            cols: *cols,
        }),
        _ => None,
    }
}

fn decode_key(key: &KeyEvent) -> Option<FinderEvent> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let event = match key.code {
        KeyCode::Esc => FinderEvent::Cancel,
        KeyCode::Enter => FinderEvent::Commit,
        KeyCode::Backspace => FinderEvent::Backspace,
        KeyCode::Delete => FinderEvent::Delete,
        KeyCode::Left => FinderEvent::Left,
        KeyCode::Right => FinderEvent::Right,
        KeyCode::Up => FinderEvent::Up,
        KeyCode::Down => FinderEvent::Down,
        KeyCode::Char(c) if ctrl => match c.to_ascii_lowercase() {
            'c' => FinderEvent::Cancel,
            'p' | 'k' => FinderEvent::Up,
            'n' | 'j' => FinderEvent::Down,
            _ => FinderEvent::Insert(c),
        },
        KeyCode::Char(c) => FinderEvent::Insert(c),
        KeyCode::Tab => FinderEvent::Insert('\t'),
        _ => return None,
    };
    Some(event)
}
