//! Incremental interactive note finder
//!
//! One event loop on one thread: read an event, update the [`SearchState`],
//! re-run the lookup if the query text changed, redraw what changed. Every
//! lookup finishes before the next key is read, so results can never be
//! stale.
//!
//! # Screen layout
//!
//! ```text
//! row 0   > meeting #work_          input line
//! row 1   2 notes                   status line
//! row 2   > Meeting notes           results, `rows - 2` of them
//! row 3     Weekly meeting
//! ```

pub mod render;
pub mod state;

pub use render::{Damage, PointerMove, Renderer};
pub use state::{HEADER_ROWS, SearchState, Transition, transition};

use crate::filter::QueryCompiler;
use crate::index::{NoteId, NoteSource};
use crate::ui::{Result, Surface};

/// Symbolic input events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinderEvent {
    /// Printable character typed at the cursor
    Insert(char),
    /// Remove the character before the cursor
    Backspace,
    /// Remove the character at the cursor
    Delete,
    /// Cursor one character left, wrapping to the end
    Left,
    /// Cursor one character right, wrapping to the start
    Right,
    /// Selection one row up
    Up,
    /// Selection one row down
    Down,
    /// Terminal has a new size
    Resize { rows: u16, cols: u16 },
    /// Accept the selected note
    Commit,
    /// Leave without a selection
    Cancel,
}

/// How a finder session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinderOutcome {
    Committed(NoteId),
    Cancelled,
}

/// Runs finder sessions
#[derive(Debug, Clone, Default)]
pub struct Finder {
    compiler: QueryCompiler,
    renderer: Renderer,
}

impl Finder {
    #[must_use]
    pub const fn new(compiler: QueryCompiler, renderer: Renderer) -> Self {
        Self { compiler, renderer }
    }

    /// Run one session until the user commits or cancels
    ///
    /// Lookup failures never end the session: they empty the result list and
    /// show up on the status line.
    ///
    /// # Arguments
    /// * `surface` - Terminal to draw on and read events from
    /// * `source` - Search function answering each query
    ///
    /// # Errors
    ///
    /// Returns `UiError` if the surface cannot be sized, drawn to or read from.
    pub fn run<S, N>(&self, surface: &mut S, source: &N) -> Result<FinderOutcome>
    where
        S: Surface + ?Sized,
        N: NoteSource + ?Sized,
    {
        let (rows, _) = surface.size()?;
        let mut state = SearchState::new(rows);
        state.refresh(&self.compiler, source);
        self.renderer.draw(surface, &state, &Damage::all())?;

        loop {
            let event = surface.next_event()?;
            let transition = state.apply(event);
            if let Some(outcome) = transition.outcome {
                return Ok(outcome);
            }
            if transition.requery {
                state.refresh(&self.compiler, source);
            }
            self.renderer.draw(surface, &state, &transition.damage)?;
        }
    }
}
