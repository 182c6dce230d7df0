//! Finder state and its transition function
//!
//! [`SearchState::apply`] is pure: it never reads the terminal or the index.
//! It reports what the loop has to do next in a [`Transition`]: stop, re-run
//! the lookup, and which parts of the screen are stale.

use super::render::Damage;
use super::{FinderEvent, FinderOutcome};
use crate::filter::QueryCompiler;
use crate::index::{NoteHit, NoteSource};
use crate::ui::StatusMessage;

/// Rows above the result list: input line and status line
pub const HEADER_ROWS: u16 = 2;

/// Effect of one event
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transition {
    /// Set when the session ends
    pub outcome: Option<FinderOutcome>,
    /// Screen regions to repaint
    pub damage: Damage,
    /// Query text changed: compile and look up again
    pub requery: bool,
}

impl Transition {
    fn finish(outcome: FinderOutcome) -> Self {
        Self {
            outcome: Some(outcome),
            ..Self::default()
        }
    }
}

/// Everything one finder session knows
///
/// Invariants, with `N` results and `H` visible rows:
/// - `cursor <= buffer.chars().count()`
/// - `selection` is `None` iff `N == 0`, else `< N`
/// - `viewport_start <= max(0, N - H)`
/// - the selection lies inside `viewport_start .. viewport_start + H`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    buffer: String,
    cursor: usize,
    results: Vec<NoteHit>,
    selection: Option<usize>,
    viewport_start: usize,
    visible_rows: usize,
    status: Option<StatusMessage>,
}

impl SearchState {
    /// Empty query on a terminal `rows` high
    #[must_use]
    pub fn new(rows: u16) -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            results: Vec::new(),
            selection: None,
            viewport_start: 0,
            visible_rows: visible_rows_for(rows),
            status: None,
        }
    }

    #[must_use]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Cursor position in characters
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn results(&self) -> &[NoteHit] {
        &self.results
    }

    #[must_use]
    pub const fn selection(&self) -> Option<usize> {
        self.selection
    }

    #[must_use]
    pub const fn viewport_start(&self) -> usize {
        self.viewport_start
    }

    #[must_use]
    pub const fn visible_rows(&self) -> usize {
        self.visible_rows
    }

    #[must_use]
    pub const fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// The hit under the pointer
    #[must_use]
    pub fn selected(&self) -> Option<&NoteHit> {
        self.selection.and_then(|i| self.results.get(i))
    }

    /// Results inside the viewport, with their indices
    pub fn visible(&self) -> impl Iterator<Item = (usize, &NoteHit)> {
        self.results
            .iter()
            .enumerate()
            .skip(self.viewport_start)
            .take(self.visible_rows)
    }

    /// Compile the buffer, run the lookup and take its results
    ///
    /// A failed lookup leaves an empty result list and an error status
    /// instead of ending the session.
    pub fn refresh<N>(&mut self, compiler: &QueryCompiler, source: &N)
    where
        N: NoteSource + ?Sized,
    {
        let compiled = compiler.compile(&self.buffer);
        match source.search(&compiled.filter) {
            Ok(hits) => {
                self.status = None;
                self.set_results(hits);
            }
            Err(e) => {
                self.status = Some(StatusMessage::error(e.to_string()));
                self.set_results(Vec::new());
            }
        }
    }

    /// Replace the results; selection goes back to the first row
    pub fn set_results(&mut self, results: Vec<NoteHit>) {
        self.results = results;
        self.selection = if self.results.is_empty() { None } else { Some(0) };
        self.viewport_start = 0;
    }

    /// Apply one event
    pub fn apply(&mut self, event: FinderEvent) -> Transition {
        match event {
            FinderEvent::Insert(c) => {
                let at = self.byte_offset(self.cursor);
                self.buffer.insert(at, c);
                self.cursor += 1;
                Self::edited()
            }
            FinderEvent::Backspace => {
                if self.cursor == 0 {
                    return Transition::default();
                }
                self.cursor -= 1;
                let at = self.byte_offset(self.cursor);
                self.buffer.remove(at);
                Self::edited()
            }
            FinderEvent::Delete => {
                if self.cursor >= self.char_len() {
                    return Transition::default();
                }
                let at = self.byte_offset(self.cursor);
                self.buffer.remove(at);
                Self::edited()
            }
            FinderEvent::Left => {
                let span = self.char_len() + 1;
                self.move_cursor((self.cursor + span - 1) % span)
            }
            FinderEvent::Right => {
                let span = self.char_len() + 1;
                self.move_cursor((self.cursor + 1) % span)
            }
            FinderEvent::Up => self.step_selection(-1),
            FinderEvent::Down => self.step_selection(1),
            FinderEvent::Resize { rows, .. } => {
                self.visible_rows = visible_rows_for(rows);
                self.fit_viewport();
                Transition {
                    damage: Damage::all(),
                    ..Transition::default()
                }
            }
            FinderEvent::Commit => match self.selected() {
                Some(hit) => Transition::finish(FinderOutcome::Committed(hit.id.clone())),
                None => Transition::default(),
            },
            FinderEvent::Cancel => Transition::finish(FinderOutcome::Cancelled),
        }
    }

    fn edited() -> Transition {
        Transition {
            outcome: None,
            damage: Damage::all(),
            requery: true,
        }
    }

    fn move_cursor(&mut self, to: usize) -> Transition {
        if to == self.cursor {
            return Transition::default();
        }
        self.cursor = to;
        Transition {
            damage: Damage::input(),
            ..Transition::default()
        }
    }

    /// Move the selection by `delta` rows and scroll or wrap as needed
    fn step_selection(&mut self, delta: isize) -> Transition {
        let Some(current) = self.selection else {
            return Transition::default();
        };
        let candidate = isize::try_from(current).unwrap_or(isize::MAX) + delta;
        let full = self.clamp_selection(candidate);

        let damage = match self.selection {
            _ if full => Damage::results(),
            Some(to) if to != current => Damage::pointer(current, to),
            _ => Damage::default(),
        };
        Transition {
            damage,
            ..Transition::default()
        }
    }

    /// Settle a candidate selection; returns true when the viewport moved
    ///
    /// Linear motion scrolls one row at a time; stepping past either end
    /// wraps and jumps the window to the other end.
    fn clamp_selection(&mut self, candidate: isize) -> bool {
        let count = self.results.len();
        let rows = self.visible_rows;
        if count == 0 {
            self.selection = None;
            self.viewport_start = 0;
            return false;
        }

        if candidate < 0 {
            self.selection = Some(count - 1);
            self.viewport_start = count.saturating_sub(rows);
            return true;
        }

        let selection = candidate.unsigned_abs();
        if selection >= count {
            self.selection = Some(0);
            self.viewport_start = 0;
            return true;
        }

        self.selection = Some(selection);
        if selection >= self.viewport_start + rows {
            self.viewport_start += 1;
            true
        } else if selection < self.viewport_start {
            self.viewport_start -= 1;
            true
        } else {
            false
        }
    }

    /// Restore the viewport invariants after the row count changed
    fn fit_viewport(&mut self) {
        let Some(selection) = self.selection else {
            self.viewport_start = 0;
            return;
        };
        let rows = self.visible_rows;
        if selection >= self.viewport_start + rows {
            self.viewport_start = selection + 1 - rows;
        }
        self.viewport_start = self
            .viewport_start
            .min(selection)
            .min(self.results.len().saturating_sub(rows));
    }

    fn char_len(&self) -> usize {
        self.buffer.chars().count()
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(chars)
            .map_or(self.buffer.len(), |(at, _)| at)
    }
}

/// Pure form of [`SearchState::apply`]
#[must_use]
pub fn transition(mut state: SearchState, event: FinderEvent) -> (SearchState, Transition) {
    let effect = state.apply(event);
    (state, effect)
}

fn visible_rows_for(rows: u16) -> usize {
    usize::from(rows.saturating_sub(HEADER_ROWS).max(1))
}
