//! Crossterm terminal surface
//!
//! Cells are written straight to the ratatui backend; there is no
//! frame-based rendering. A shadow [`Buffer`] mirrors what is on screen, so
//! every write only emits the cells that actually change.
//!
//! Raw mode and the alternate screen are held by a [`TerminalGuard`] and
//! released on drop, on every exit path. A panic hook restores the terminal
//! before the panic message is printed. On unix, SIGTERM, SIGHUP and SIGINT
//! restore it too before the process exits with `128 + signal`.

use super::error::{Result, UiError};
use super::keys;
use super::surface::Surface;
use crate::finder::FinderEvent;
use crossterm::cursor::Show;
use crossterm::event;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::{Backend, ClearType, CrosstermBackend};
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::Style;
use std::io::{self, Stdout};
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};

static PANIC_HOOK: Once = Once::new();
/// Set while a [`TerminalGuard`] holds the terminal
static ACTIVE: AtomicBool = AtomicBool::new(false);

/// Raw mode plus alternate screen, released on drop
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    /// Enter raw mode and the alternate screen
    ///
    /// # Errors
    ///
    /// Returns `UiError::IoError` if the terminal refuses either mode; raw
    /// mode is already disabled again when that happens.
    pub fn acquire() -> Result<Self> {
        install_panic_hook();
        #[cfg(unix)]
        signals::install()?;
        enable_raw_mode()?;
        ACTIVE.store(true, Ordering::SeqCst);
        let guard = Self { _private: () };
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// Leave the alternate screen and raw mode, ignoring failures
///
/// Does nothing once the terminal has been released.
fn restore_terminal() {
    if !ACTIVE.swap(false, Ordering::SeqCst) {
        return;
    }
    let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
    let _ = disable_raw_mode();
}

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_terminal();
            previous(info);
        }));
    });
}

#[cfg(unix)]
mod signals {
    use super::{Result, restore_terminal};
    use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;
    use std::sync::Mutex;
    use std::{process, thread};

    /// Signals that end the process with the terminal restored
    pub(super) const TERMINATING: [i32; 3] = [SIGTERM, SIGHUP, SIGINT];

    pub(super) static INSTALLED: Mutex<bool> = Mutex::new(false);

    /// Start the thread that waits for a terminating signal
    ///
    /// Only the first successful call registers anything.
    pub(super) fn install() -> Result<()> {
        let mut installed = INSTALLED.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if *installed {
            return Ok(());
        }

        let mut signals = Signals::new(TERMINATING)?;
        thread::Builder::new()
            .name("zk-signals".to_string())
            .spawn(move || {
                if let Some(signal) = signals.forever().next() {
                    restore_terminal();
                    process::exit(exit_status(signal));
                }
            })?;
        *installed = true;
        Ok(())
    }

    /// Shell convention for a process ended by `signal`
    pub(super) const fn exit_status(signal: i32) -> i32 {
        128 + signal
    }
}

/// [`Surface`] over the real terminal
pub struct TerminalSurface {
    backend: CrosstermBackend<Stdout>,
    screen: Buffer,
    // Declared last: released after the backend is dropped
    _guard: TerminalGuard,
}

impl TerminalSurface {
    /// Take over the terminal
    ///
    /// # Errors
    ///
    /// Returns `UiError` if raw mode cannot be entered or the terminal size
    /// cannot be read.
    pub fn new() -> Result<Self> {
        let guard = TerminalGuard::acquire()?;
        let mut backend = CrosstermBackend::new(io::stdout());
        backend.clear_region(ClearType::All)?;

        let size = backend.size()?;
        let screen = Buffer::empty(Rect::new(0, 0, size.width, size.height));

        Ok(Self {
            backend,
            screen,
            _guard: guard,
        })
    }

    /// Forget the screen contents after the terminal changed size
    fn reset_screen(&mut self, rows: u16, cols: u16) -> Result<()> {
        self.backend.clear_region(ClearType::All)?;
        self.screen = Buffer::empty(Rect::new(0, 0, cols, rows));
        Ok(())
    }
}

impl Surface for TerminalSurface {
    fn size(&self) -> Result<(u16, u16)> {
        let size = self
            .backend
            .size()
            .map_err(|e| UiError::TerminalError(format!("cannot read terminal size: {e}")))?;
        Ok((size.height, size.width))
    }

    fn write(&mut self, row: u16, col: u16, text: &str, width: u16, style: Style) -> Result<()> {
        let area = self.screen.area;
        if row >= area.height || col >= area.width {
            return Ok(());
        }
        let width = width.min(area.width - col);
        let region = Rect::new(col, row, width, 1);

        let mut before = Buffer::empty(region);
        for x in region.left()..region.right() {
            before[(x, row)] = self.screen[(x, row)].clone();
        }

        let mut after = Buffer::empty(region);
        after.set_style(region, style);
        after.set_stringn(col, row, text, usize::from(width), style);

        self.backend.draw(before.diff(&after).into_iter())?;
        self.screen.merge(&after);
        Ok(())
    }

    fn move_cursor(&mut self, row: u16, col: u16) -> Result<()> {
        self.backend.set_cursor_position(Position::new(col, row))?;
        self.backend.show_cursor()?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Backend::flush(&mut self.backend)?;
        Ok(())
    }

    fn next_event(&mut self) -> Result<FinderEvent> {
        loop {
            let raw = event::read()?;
            let Some(decoded) = keys::decode(&raw) else {
                continue;
            };
            if let FinderEvent::Resize { rows, cols } = decoded {
                self.reset_screen(rows, cols)?;
            }
            return Ok(decoded);
        }
    }
}
