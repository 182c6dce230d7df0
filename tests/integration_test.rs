//! Integration tests for zk
//!
//! These tests build real index files in temporary vaults and drive the
//! finder and the commands through the public API only.

use chrono::{TimeZone, Utc};
use ratatui::style::Style;
use std::collections::VecDeque;
use std::path::Path;
use tempfile::TempDir;
use zettel::{
    ZettelError,
    commands::{self, Session, list::ListOptions},
    config::ZkConfig,
    filter::QueryCompiler,
    finder::{Finder, FinderEvent, FinderOutcome, Renderer},
    index::{IndexError, IndexRecord, LookupTranslator, NoteId, NoteIndex, SortColumn, SortSpec},
    ui::{BufferedWriter, MessageLevel, Surface, Theme, UiError},
};

/// Plain character grid fed from a list of events
struct ScriptedSurface {
    rows: Vec<Vec<char>>,
    events: VecDeque<FinderEvent>,
    cursor: (u16, u16),
}

impl ScriptedSurface {
    fn new(rows: u16, cols: u16, events: impl IntoIterator<Item = FinderEvent>) -> Self {
        Self {
            rows: vec![vec![' '; usize::from(cols)]; usize::from(rows)],
            events: events.into_iter().collect(),
            cursor: (0, 0),
        }
    }

    fn line(&self, row: usize) -> String {
        self.rows[row].iter().collect::<String>().trim_end().to_string()
    }
}

impl Surface for ScriptedSurface {
    fn size(&self) -> Result<(u16, u16), UiError> {
        let rows = u16::try_from(self.rows.len()).unwrap();
        let cols = u16::try_from(self.rows.first().map_or(0, Vec::len)).unwrap();
        Ok((rows, cols))
    }

    fn write(&mut self, row: u16, col: u16, text: &str, width: u16, _style: Style) -> Result<(), UiError> {
        let Some(line) = self.rows.get_mut(usize::from(row)) else {
            return Ok(());
        };
        let mut chars = text.chars();
        let start = usize::from(col);
        let end = (start + usize::from(width)).min(line.len());
        for cell in line.iter_mut().take(end).skip(start) {
            *cell = chars.next().unwrap_or(' ');
        }
        Ok(())
    }

    fn move_cursor(&mut self, row: u16, col: u16) -> Result<(), UiError> {
        self.cursor = (row, col);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), UiError> {
        Ok(())
    }

    fn next_event(&mut self) -> Result<FinderEvent, UiError> {
        let event = self
            .events
            .pop_front()
            .ok_or_else(|| UiError::TerminalError("script exhausted".to_string()))?;
        if let FinderEvent::Resize { rows, cols } = event {
            self.rows = vec![vec![' '; usize::from(cols)]; usize::from(rows)];
        }
        Ok(event)
    }
}

fn typed(text: &str) -> impl Iterator<Item = FinderEvent> + '_ {
    text.chars().map(FinderEvent::Insert)
}

/// Vault with an index of twelve notes: `n01` .. `n12`
fn vault() -> TempDir {
    let dir = TempDir::new().unwrap();
    let mut index = NoteIndex::create(dir.path().join(".index.db"), false).unwrap();
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    for n in 1..=12 {
        let tags: &[&str] = match n % 3 {
            0 => &["#project", "#rust"],
            1 => &["#project"],
            _ => &["#journal"],
        };
        let links: &[&str] = if n % 4 == 0 { &["Index"] } else { &[] };
        let record = IndexRecord::new(format!("n{n:02}"), format!("Note number {n}"), "ada")
            .with_dates(base + chrono::Duration::hours(n), base + chrono::Duration::days(n))
            .with_tags(tags)
            .with_links(links.iter().copied());
        index.add_note(&record).unwrap();
    }
    dir
}

fn open(dir: &Path) -> NoteIndex {
    NoteIndex::open(dir.join(".index.db")).unwrap()
}

#[test]
fn test_finder_scrolls_and_commits() {
    let dir = vault();
    let index = open(dir.path());
    let translator = LookupTranslator::new(&index, SortSpec::default());

    // 6 rows: 4 visible results
    let mut events: Vec<FinderEvent> = typed("#project").collect();
    events.extend(std::iter::repeat_n(FinderEvent::Down, 5));
    events.push(FinderEvent::Commit);
    let mut surface = ScriptedSurface::new(6, 40, events);

    let outcome = Finder::default().run(&mut surface, &translator).unwrap();

    // #project: n01 n03 n04 n06 n07 n09 n10 n12; five steps down lands on n09
    assert_eq!(outcome, FinderOutcome::Committed(NoteId::from("n09")));
    assert_eq!(surface.line(0), "> #project");
    assert_eq!(surface.line(1), "8 notes");
    assert_eq!(surface.line(5), "> Note number 9");
    assert_eq!(surface.cursor, (0, 10));
}

#[test]
fn test_finder_negation_and_links() {
    let dir = vault();
    let index = open(dir.path());
    let translator = LookupTranslator::new(&index, SortSpec::default());

    let mut events: Vec<FinderEvent> = typed("[[Index]] !#journal").collect();
    events.push(FinderEvent::Commit);
    let mut surface = ScriptedSurface::new(10, 40, events);

    let outcome = Finder::default().run(&mut surface, &translator).unwrap();
    assert_eq!(outcome, FinderOutcome::Committed(NoteId::from("n04")));
    // n04 n08 n12 link to Index; n08 is a journal note
    assert_eq!(surface.line(1), "2 notes");
    assert_eq!(surface.line(3), "  Note number 12");
}

#[test]
fn test_finder_wraps_to_last_note() {
    let dir = vault();
    let index = open(dir.path());
    let translator = LookupTranslator::new(&index, SortSpec::by(SortColumn::Changed).descending());

    let mut surface = ScriptedSurface::new(5, 30, [FinderEvent::Up, FinderEvent::Commit]);
    let outcome = Finder::default().run(&mut surface, &translator).unwrap();

    // Newest first, so the last row is the oldest note
    assert_eq!(outcome, FinderOutcome::Committed(NoteId::from("n01")));
    assert_eq!(surface.line(4), "> Note number 1");
}

#[test]
fn test_finder_edits_query() {
    let dir = vault();
    let index = open(dir.path());
    let translator = LookupTranslator::new(&index, SortSpec::default());

    let mut events: Vec<FinderEvent> = typed("number 1x").collect();
    events.extend([
        FinderEvent::Backspace,
        FinderEvent::Left,
        FinderEvent::Left,
        FinderEvent::Insert('2'),
        FinderEvent::Cancel,
    ]);
    let mut surface = ScriptedSurface::new(10, 40, events);

    let outcome = Finder::default().run(&mut surface, &translator).unwrap();
    assert_eq!(outcome, FinderOutcome::Cancelled);
    // "number 1" with '2' inserted before the final space: "number2 1"
    assert_eq!(surface.line(0), "> number2 1");
    assert_eq!(surface.line(1), "0 notes");
    assert_eq!(surface.cursor, (0, 9));
}

#[test]
fn test_finder_survives_dropped_tables() {
    let dir = vault();
    let index = open(dir.path());
    let translator = LookupTranslator::new(&index, SortSpec::default());

    // Another process removes the index tables after the finder opened it
    drop_tables(&dir.path().join(".index.db"));

    let mut events: Vec<FinderEvent> = typed("x").collect();
    events.push(FinderEvent::Cancel);
    let mut surface = ScriptedSurface::new(8, 60, events);

    let outcome = Finder::default().run(&mut surface, &translator).unwrap();
    assert_eq!(outcome, FinderOutcome::Cancelled);
    assert!(surface.line(1).starts_with("Index unavailable"));
    assert_eq!(surface.line(2), "");
}

fn drop_tables(path: &Path) {
    let conn = rusqlite::Connection::open(path).unwrap();
    conn.execute_batch("DROP TABLE links; DROP TABLE tags; DROP TABLE zettelkasten;")
        .unwrap();
}

#[test]
fn test_finder_resize_keeps_selection_visible() {
    let dir = vault();
    let index = open(dir.path());
    let translator = LookupTranslator::new(&index, SortSpec::default());

    let mut events = vec![FinderEvent::Down; 8];
    events.push(FinderEvent::Resize { rows: 4, cols: 30 });
    events.push(FinderEvent::Commit);
    let mut surface = ScriptedSurface::new(12, 30, events);

    let outcome = Finder::default().run(&mut surface, &translator).unwrap();
    assert_eq!(outcome, FinderOutcome::Committed(NoteId::from("n09")));
    assert_eq!(surface.line(3), "> Note number 9");
}

#[test]
fn test_finder_with_custom_delimiters() {
    let dir = vault();
    let index = open(dir.path());
    let translator = LookupTranslator::new(&index, SortSpec::default());

    let finder = Finder::new(
        QueryCompiler::new("((", "))").unwrap(),
        Renderer::new(Theme::plain(), "? ", "*").unwrap(),
    );
    let mut events: Vec<FinderEvent> = typed("((Index)) [[Index]]").collect();
    events.push(FinderEvent::Cancel);
    let mut surface = ScriptedSurface::new(8, 40, events);

    finder.run(&mut surface, &translator).unwrap();
    // `[[Index]]` stays title text under the custom delimiters
    assert_eq!(surface.line(0), "? ((Index)) [[Index]]");
    assert_eq!(surface.line(1), "0 notes");
}

#[test]
fn test_commands_workflow() {
    let dir = TempDir::new().unwrap();
    let session = Session::new(ZkConfig::default(), Some(dir.path()));
    let output = BufferedWriter::new();

    let err = commands::list(&session, &ListOptions::default(), &output).unwrap_err();
    assert!(matches!(err, ZettelError::Index(IndexError::Unavailable(_))));

    commands::init(&session, false, &output).unwrap();
    {
        let mut index = session.open_index().unwrap();
        index
            .add_note(&IndexRecord::new("z1", "First thought", "ada").with_tags(["idea"]))
            .unwrap();
        index
            .add_note(&IndexRecord::new("z2", "Second thought", "bob").with_links(["z1"]))
            .unwrap();
    }

    let options = ListOptions {
        query: Some("thought #idea".to_string()),
        ..ListOptions::default()
    };
    commands::list(&session, &options, &output).unwrap();
    assert_eq!(output.messages_at(MessageLevel::Normal), vec!["z1\tFirst thought"]);

    let output = BufferedWriter::new();
    commands::show(&session, "z2", false, &output).unwrap();
    let lines = output.messages_at(MessageLevel::Normal);
    assert!(lines.contains(&"author:  bob".to_string()));
    assert!(lines.contains(&"links:   z1".to_string()));

    let err = commands::init(&session, false, &output).unwrap_err();
    assert!(matches!(err, ZettelError::Index(IndexError::AlreadyExists(_))));
}
