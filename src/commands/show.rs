//! Show command - print the indexed metadata of one note

use super::Session;
use crate::{
    ZettelError,
    index::{IndexRecord, NoteId, types::format_date},
    ui::OutputWriter,
};

type Result<T> = std::result::Result<T, ZettelError>;

/// Execute the show command
///
/// # Errors
///
/// Returns an error if the index is unavailable or has no note `id`.
pub fn execute(session: &Session, id: &str, json: bool, output: &dyn OutputWriter) -> Result<()> {
    let index = session.open_index()?;
    let record = index.metadata(&NoteId::from(id))?;

    if json {
        output.write(&serde_json::to_string_pretty(&record)?);
    } else {
        for line in describe(&record) {
            output.write(&line);
        }
    }
    Ok(())
}

fn describe(record: &IndexRecord) -> Vec<String> {
    let join = |set: &std::collections::BTreeSet<String>| {
        set.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
    };
    vec![
        format!("id:      {}", record.id),
        format!("title:   {}", record.title),
        format!("author:  {}", record.author),
        format!("created: {}", format_date(&record.created)),
        format!("changed: {}", format_date(&record.changed)),
        format!("tags:    {}", join(&record.tags)),
        format!("links:   {}", join(&record.links)),
    ]
}
