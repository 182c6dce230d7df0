//! Render adapter: terminal I/O behind a small trait
//!
//! The finder never touches the terminal directly. It draws through the
//! [`Surface`] trait, which the real terminal and the test mock both
//! implement.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │      Finder (state + redraw policy)     │
//! └────────────────┬────────────────────────┘
//!                  │ Uses trait
//!                  ▼
//! ┌─────────────────────────────────────────┐
//! │      Surface                            │
//! │  (size, write, move_cursor, flush,      │
//! │   next_event)                           │
//! └────────────────┬────────────────────────┘
//!                  │ Implemented by
//!         ┌────────┴────────┐
//!         ▼                 ▼
//! ┌───────────────┐  ┌───────────────────┐
//! │ Terminal      │  │ MockSurface       │
//! │ (crossterm +  │  │ (ratatui Buffer,  │
//! │  ratatui)     │  │  tests only)      │
//! └───────────────┘  └───────────────────┘
//! ```
//!
//! ## Output Messages
//!
//! ```
//! use zettel::ui::output::{OutputWriter, StdoutWriter};
//!
//! let output = StdoutWriter::new();
//! output.success("Operation completed!");
//! output.error("Something went wrong");
//! output.warning("Be careful");
//! output.info("Additional info");
//! ```

mod error;

pub mod keys;
pub mod output;
pub mod surface;
pub mod terminal;
pub mod theme;

#[cfg(test)]
pub mod mock;

pub use error::{Result, UiError};
pub use output::{BufferedWriter, MessageLevel, OutputWriter, StatusMessage, StdoutWriter};
pub use surface::Surface;
pub use terminal::{TerminalGuard, TerminalSurface};
pub use theme::Theme;
