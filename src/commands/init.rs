//! Init command - create the vault's index

use super::Session;
use crate::{ZettelError, index::NoteIndex, ui::OutputWriter};

type Result<T> = std::result::Result<T, ZettelError>;

/// Execute the init command
///
/// # Errors
///
/// Returns `IndexError::AlreadyExists` (wrapped) if the vault already has an
/// index and `force` is false.
pub fn execute(session: &Session, force: bool, output: &dyn OutputWriter) -> Result<()> {
    let path = session.index_path();
    NoteIndex::create(&path, force)?;
    output.success(&format!("Created index at {}", path.display()));
    Ok(())
}
