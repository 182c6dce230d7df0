//! List command - print the notes matching a query

use super::Session;
use crate::{
    ZettelError,
    filter::{Column, Filter, NEGATION_MARKER, Pattern, TAG_MARKER},
    index::{Field, LookupTranslator, ResultRow, SortColumn, SortSpec},
    ui::OutputWriter,
};

type Result<T> = std::result::Result<T, ZettelError>;

/// Parsed `list` arguments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub query: Option<String>,
    pub authors: Vec<String>,
    pub tags: Vec<String>,
    pub links: Vec<String>,
    pub mine: bool,
    pub sort: Option<SortColumn>,
    pub descending: bool,
    pub show: Vec<Field>,
    pub json: bool,
}

/// Execute the list command
///
/// # Errors
///
/// Returns an error if the index is unavailable, `--mine` is used without a
/// configured author, or the lookup fails.
pub fn execute(session: &Session, options: &ListOptions, output: &dyn OutputWriter) -> Result<()> {
    let filter = build_filter(session, options)?;
    let fields = projection(&options.show);
    let sort = sort_spec(session, options);

    let index = session.open_index()?;
    let rows = LookupTranslator::new(&index, sort).rows(&filter, &fields)?;

    if options.json {
        output.write(&serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        output.info("No notes found.");
        return Ok(());
    }
    for row in &rows {
        output.write(&format_row(row));
    }
    output.info(&match rows.len() {
        1 => "1 note".to_string(),
        n => format!("{n} notes"),
    });
    Ok(())
}

/// Query text and flags combined into one filter
fn build_filter(session: &Session, options: &ListOptions) -> Result<Filter> {
    let mut filter = match options.query.as_deref() {
        Some(query) => session.config.compiler()?.compile(query).filter,
        None => Filter::new(),
    };

    for raw in &options.authors {
        filter.push(Column::Author, flag_pattern(raw));
    }
    for raw in &options.links {
        filter.push(Column::Link, flag_pattern(raw));
    }
    for raw in &options.tags {
        let (negated, body) = split_negation(raw);
        let body = body.strip_prefix(TAG_MARKER).unwrap_or(body);
        filter.push(Column::Tag, Pattern::tag(body, negated));
    }

    if options.mine {
        let author = session.config.author.as_deref().ok_or_else(|| {
            ZettelError::InvalidInput("--mine needs `author` set in the configuration".to_string())
        })?;
        filter.push(Column::Author, Pattern::contains(author, false));
    }
    Ok(filter)
}

fn flag_pattern(raw: &str) -> Pattern {
    let (negated, body) = split_negation(raw);
    Pattern::contains(body, negated)
}

fn split_negation(raw: &str) -> (bool, &str) {
    raw.strip_prefix(NEGATION_MARKER)
        .map_or((false, raw), |rest| (true, rest))
}

/// Requested fields with `id` in front when it was left out
fn projection(show: &[Field]) -> Vec<Field> {
    if show.is_empty() {
        return Field::DISPLAY.to_vec();
    }
    let mut fields = show.to_vec();
    if !fields.contains(&Field::Id) {
        fields.insert(0, Field::Id);
    }
    fields
}

/// Flags override the configured order; `--desc` alone reverses it
fn sort_spec(session: &Session, options: &ListOptions) -> SortSpec {
    let configured = session.config.sort_spec();
    match options.sort {
        Some(column) => SortSpec::new(Some(column), options.descending),
        None if options.descending => SortSpec::new(configured.column, true),
        None => configured,
    }
}

fn format_row(row: &ResultRow) -> String {
    row.iter()
        .map(|(_, value)| value.unwrap_or_default())
        .collect::<Vec<_>>()
        .join("\t")
}
