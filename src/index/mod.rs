//! Note index backed by SQLite
//!
//! The index is a side table derived from the note files of a vault. It lives
//! in a single file (`.index.db` by default) with three tables, see
//! [`schema`]. Opening never creates anything: a vault that has not been
//! initialised reports [`IndexError::Unavailable`] so callers can tell
//! "no index" apart from "no results".
//!
//! Lookups go through [`query::LookupTranslator`]; this module only owns the
//! connection and the maintenance operations.

pub mod error;
pub mod query;
pub mod schema;
pub mod types;

pub use error::{IndexError, IndexResult};
pub use query::{Field, LookupTranslator, NoteSource, QueryPlan, ResultRow, SortColumn, SortSpec};
pub use types::{IndexRecord, NoteHit, NoteId};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row, Transaction, params};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use types::{format_date, normalize_tag, parse_date};

/// Default file name of the index inside a vault
pub const DEFAULT_INDEX_FILE: &str = ".index.db";

/// How long a lookup waits on a locked index before giving up
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(2000);

/// Handle to an opened note index
///
/// The handle is passed to whoever needs it; there is no process-wide
/// connection.
#[derive(Debug)]
pub struct NoteIndex {
    conn: Connection,
    path: Option<PathBuf>,
}

impl NoteIndex {
    /// Open an existing index
    ///
    /// # Arguments
    /// * `path` - Path to the index file
    ///
    /// # Examples
    /// ```no_run
    /// use zettel::index::NoteIndex;
    /// let index = NoteIndex::open("vault/.index.db").unwrap();
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Unavailable` if the file does not exist, is not a
    /// SQLite database, or lacks one of the index tables.
    pub fn open<P: AsRef<Path>>(path: P) -> IndexResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(IndexError::Unavailable(format!(
                "no index at {} (run `zk init` first)",
                path.display()
            )));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        schema::configure(&conn)?;

        let missing = schema::missing_tables(&conn)?;
        if !missing.is_empty() {
            return Err(IndexError::Unavailable(format!(
                "{} is missing table(s): {}",
                path.display(),
                missing.join(", ")
            )));
        }

        let index = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        index.set_busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
        Ok(index)
    }

    /// Create a new, empty index file
    ///
    /// Parent directories are created as needed.
    ///
    /// # Arguments
    /// * `path` - Path to the index file
    /// * `force` - Drop and recreate the tables of an existing index
    ///
    /// # Errors
    ///
    /// Returns `IndexError::AlreadyExists` if an index with tables is already
    /// present and `force` is false, or `IndexError::Io` / `IndexError::Sqlite`
    /// if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P, force: bool) -> IndexResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        schema::configure(&conn)?;

        let existing = schema::missing_tables(&conn)?.len() < schema::TABLES.len();
        if existing {
            if !force {
                return Err(IndexError::AlreadyExists(path.to_path_buf()));
            }
            schema::drop_all(&conn)?;
        }
        schema::create(&conn)?;

        let index = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        index.set_busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
        Ok(index)
    }

    /// Open a fresh in-memory index with the full schema
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Sqlite` if SQLite cannot allocate the database.
    pub fn open_in_memory() -> IndexResult<Self> {
        let conn = Connection::open_in_memory()?;
        schema::configure(&conn)?;
        schema::create(&conn)?;
        Ok(Self { conn, path: None })
    }

    /// Limit how long statements wait on a locked database
    ///
    /// A statement still blocked after `timeout` fails with
    /// `IndexError::Unavailable`.
    ///
    /// # Errors
    ///
    /// Returns `IndexError` if SQLite rejects the setting.
    pub fn set_busy_timeout(&self, timeout: Duration) -> IndexResult<()> {
        self.conn.busy_timeout(timeout)?;
        Ok(())
    }

    /// Path of the index file (`None` for in-memory indexes)
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) const fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Add a note with its tags and links
    ///
    /// # Errors
    ///
    /// Returns `IndexError::InvalidInput` if a note with the same id is already
    /// indexed, or `IndexError` if the insert fails.
    pub fn add_note(&mut self, record: &IndexRecord) -> IndexResult<()> {
        if self.contains(&record.id)? {
            return Err(IndexError::InvalidInput(format!(
                "note {} is already indexed",
                record.id
            )));
        }

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO zettelkasten (zk_id, title, author, creation_date, last_changed)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id.as_str(),
                record.title,
                record.author,
                format_date(&record.created),
                format_date(&record.changed),
            ],
        )?;
        insert_children(&tx, record)?;
        tx.commit()?;
        Ok(())
    }

    /// Replace title, author, change date, tags and links of a note
    ///
    /// The creation date is never touched.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::NotFound` if the note is not indexed, or
    /// `IndexError` if the update fails.
    pub fn update_note(&mut self, record: &IndexRecord) -> IndexResult<()> {
        let tx = self.conn.transaction()?;
        let updated = tx.execute(
            "UPDATE zettelkasten SET title = ?2, author = ?3, last_changed = ?4 WHERE zk_id = ?1",
            params![
                record.id.as_str(),
                record.title,
                record.author,
                format_date(&record.changed),
            ],
        )?;
        if updated == 0 {
            return Err(IndexError::NotFound(record.id.to_string()));
        }

        tx.execute("DELETE FROM tags WHERE zk_id = ?1", [record.id.as_str()])?;
        tx.execute("DELETE FROM links WHERE zk_id = ?1", [record.id.as_str()])?;
        insert_children(&tx, record)?;
        tx.commit()?;
        Ok(())
    }

    /// Remove a note; its tags and links go with it
    ///
    /// # Returns
    /// `true` if a note was removed
    ///
    /// # Errors
    ///
    /// Returns `IndexError` if the delete fails.
    pub fn remove_note(&self, id: &NoteId) -> IndexResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM zettelkasten WHERE zk_id = ?1", [id.as_str()])?;
        Ok(removed > 0)
    }

    /// Number of indexed notes
    ///
    /// # Errors
    ///
    /// Returns `IndexError` if the count query fails.
    pub fn count(&self) -> IndexResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM zettelkasten", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Check if a note is indexed
    ///
    /// # Errors
    ///
    /// Returns `IndexError` if the lookup fails.
    pub fn contains(&self, id: &NoteId) -> IndexResult<bool> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT 1 FROM zettelkasten WHERE zk_id = ?1")?;
        Ok(stmt.exists([id.as_str()])?)
    }

    /// All titles, in id order
    ///
    /// # Errors
    ///
    /// Returns `IndexError` if the query fails.
    pub fn titles(&self) -> IndexResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT title FROM zettelkasten ORDER BY zk_id ASC")?;
        let rows = stmt.query_map([], |row| required_text(row, 0))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Full metadata of one note
    ///
    /// # Errors
    ///
    /// Returns `IndexError::NotFound` if the note is not indexed, or
    /// `IndexError::CorruptRecord` if a stored date cannot be parsed.
    pub fn metadata(&self, id: &NoteId) -> IndexResult<IndexRecord> {
        let row = self
            .conn
            .query_row(
                "SELECT title, author, creation_date, last_changed FROM zettelkasten WHERE zk_id = ?1",
                [id.as_str()],
                |row| {
                    Ok((
                        required_text(row, 0)?,
                        required_text(row, 1)?,
                        required_text(row, 2)?,
                        required_text(row, 3)?,
                    ))
                },
            )
            .optional()?;
        let Some((title, author, created, changed)) = row else {
            return Err(IndexError::NotFound(id.to_string()));
        };

        let corrupt = |e: chrono::ParseError| IndexError::CorruptRecord {
            id: id.to_string(),
            reason: e.to_string(),
        };

        Ok(IndexRecord {
            id: id.clone(),
            title,
            author,
            created: parse_date(&created).map_err(corrupt)?,
            changed: parse_date(&changed).map_err(corrupt)?,
            tags: self.children("SELECT tag FROM tags WHERE zk_id = ?1", id)?,
            links: self.children("SELECT link FROM links WHERE zk_id = ?1", id)?,
        })
    }

    fn children(&self, sql: &str, id: &NoteId) -> IndexResult<BTreeSet<String>> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let rows = stmt.query_map([id.as_str()], |row| required_text(row, 0))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }
}

/// Column `idx` of `row` rendered as text
///
/// Indexes declared with `STRING` columns give them numeric affinity, so an
/// id such as `202401010800` comes back as an INTEGER. Numbers are turned
/// back into their text form; NULL is `None`.
pub(crate) fn column_text(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Integer(n) => Some(n.to_string()),
        ValueRef::Real(x) => Some(x.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    })
}

fn required_text(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(column_text(row, idx)?.unwrap_or_default())
}

fn insert_children(tx: &Transaction<'_>, record: &IndexRecord) -> IndexResult<()> {
    let mut tag_stmt = tx.prepare_cached("INSERT OR IGNORE INTO tags (tag, zk_id) VALUES (?1, ?2)")?;
    for tag in &record.tags {
        tag_stmt.execute([normalize_tag(tag).as_str(), record.id.as_str()])?;
    }

    let mut link_stmt =
        tx.prepare_cached("INSERT OR IGNORE INTO links (link, zk_id) VALUES (?1, ?2)")?;
    for link in &record.links {
        link_stmt.execute([link.as_str(), record.id.as_str()])?;
    }
    Ok(())
}
