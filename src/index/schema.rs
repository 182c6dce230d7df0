//! Table layout of the note index
//!
//! ```text
//! zettelkasten(zk_id PK, title, author, creation_date, last_changed)
//! tags(tag, zk_id)    -- many rows per note, cascades on note removal
//! links(link, zk_id)  -- many rows per note, cascades on note removal
//! ```

use rusqlite::Connection;

/// Primary table
pub const NOTES_TABLE: &str = "zettelkasten";
/// Child table of tags
pub const TAGS_TABLE: &str = "tags";
/// Child table of links
pub const LINKS_TABLE: &str = "links";

/// Every table a usable index must have
pub const TABLES: [&str; 3] = [NOTES_TABLE, TAGS_TABLE, LINKS_TABLE];

const CREATE_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS zettelkasten (
    zk_id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    author TEXT NOT NULL DEFAULT '',
    creation_date TEXT NOT NULL,
    last_changed TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS tags (
    tag TEXT NOT NULL,
    zk_id TEXT NOT NULL,
    PRIMARY KEY (tag, zk_id),
    FOREIGN KEY (zk_id) REFERENCES zettelkasten (zk_id) ON DELETE CASCADE
);
CREATE TABLE IF NOT EXISTS links (
    link TEXT NOT NULL,
    zk_id TEXT NOT NULL,
    PRIMARY KEY (link, zk_id),
    FOREIGN KEY (zk_id) REFERENCES zettelkasten (zk_id) ON DELETE CASCADE
);
CREATE INDEX IF NOT EXISTS tags_by_note ON tags (zk_id);
CREATE INDEX IF NOT EXISTS links_by_note ON links (zk_id);
";

const DROP_SCHEMA: &str = "
DROP TABLE IF EXISTS links;
DROP TABLE IF EXISTS tags;
DROP TABLE IF EXISTS zettelkasten;
";

/// Per-connection settings
pub(super) fn configure(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
}

pub(super) fn create(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(CREATE_SCHEMA)
}

pub(super) fn drop_all(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(DROP_SCHEMA)
}

/// Tables from [`TABLES`] that the connected database lacks
pub(super) fn missing_tables(conn: &Connection) -> rusqlite::Result<Vec<&'static str>> {
    let mut stmt = conn.prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
    let mut missing = Vec::new();
    for table in TABLES {
        if !stmt.exists([table])? {
            missing.push(table);
        }
    }
    Ok(missing)
}
