//! Find command - pick a note interactively and print its id

use super::Session;
use crate::{
    ZettelError,
    filter::Filter,
    finder::{Finder, FinderOutcome},
    index::{IndexError, IndexResult, LookupTranslator, NoteHit, NoteIndex, NoteSource, SortSpec},
    ui::{OutputWriter, Surface, TerminalSurface},
};

type Result<T> = std::result::Result<T, ZettelError>;

/// Execute the find command
///
/// A missing index does not stop the finder; the reason is shown on its
/// status line instead. The chosen id is printed after the terminal has been
/// restored.
///
/// # Returns
/// How the session ended, so the caller can pick an exit status
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the index fails in a
/// way other than being unavailable, or the terminal fails.
pub fn execute(session: &Session, output: &dyn OutputWriter) -> Result<FinderOutcome> {
    let finder = Finder::new(session.config.compiler()?, session.config.renderer()?);
    let source = open_source(session)?;

    let outcome = {
        let mut surface = TerminalSurface::new()?;
        pick(&finder, &mut surface, &source)?
    };
    report(&outcome, output);
    Ok(outcome)
}

/// Run one finder session on `surface`
///
/// # Errors
///
/// Returns `ZettelError::Ui` if the surface fails.
pub fn pick<S, N>(finder: &Finder, surface: &mut S, source: &N) -> Result<FinderOutcome>
where
    S: Surface + ?Sized,
    N: NoteSource + ?Sized,
{
    Ok(finder.run(surface, source)?)
}

/// Print the committed id, or note the cancellation
pub fn report(outcome: &FinderOutcome, output: &dyn OutputWriter) {
    match outcome {
        FinderOutcome::Committed(id) => output.write(id.as_str()),
        FinderOutcome::Cancelled => output.info("Cancelled."),
    }
}

/// The opened index, or the reason it could not be opened
enum VaultSource {
    Open(NoteIndex, SortSpec),
    Unavailable(String),
}

fn open_source(session: &Session) -> Result<VaultSource> {
    match session.open_index() {
        Ok(index) => Ok(VaultSource::Open(index, session.config.sort_spec())),
        Err(IndexError::Unavailable(reason)) => Ok(VaultSource::Unavailable(reason)),
        Err(e) => Err(e.into()),
    }
}

impl NoteSource for VaultSource {
    fn search(&self, filter: &Filter) -> IndexResult<Vec<NoteHit>> {
        match self {
            Self::Open(index, sort) => LookupTranslator::new(index, *sort).search(filter),
            Self::Unavailable(reason) => Err(IndexError::Unavailable(reason.clone())),
        }
    }
}
