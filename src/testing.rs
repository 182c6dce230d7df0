//! Testing utilities for zettel
//!
//! Provides seeded indexes so lookup and finder tests all run against the
//! same small archive.
//!
//! Only available when compiled with `cfg(test)`.

use crate::index::{DEFAULT_INDEX_FILE, IndexRecord, NoteIndex};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The sample archive: `(id, title, author, tags, links)`
///
/// Ids ascend with creation time; change times run the other way.
pub const SAMPLE_NOTES: [(&str, &str, &str, &[&str], &[&str]); 5] = [
    ("1", "Meeting notes", "ada", &["#work", "#meeting"], &["Agenda"]),
    ("2", "Weekly meeting", "bob", &["#work", "#draft"], &[]),
    ("3", "Graph theory", "ada", &["#math"], &["Euler", "Graph"]),
    ("4", "Shopping list", "bob", &[], &[]),
    ("5", "100% done", "ada", &["#idea"], &[]),
];

fn base_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()
}

/// [`SAMPLE_NOTES`] as records with deterministic dates
#[must_use]
pub fn sample_records() -> Vec<IndexRecord> {
    let count = i64::try_from(SAMPLE_NOTES.len()).unwrap();
    SAMPLE_NOTES
        .iter()
        .zip(0_i64..)
        .map(|(&(id, title, author, tags, links), n)| {
            let created = base_date() + Duration::hours(n);
            let changed = base_date() + Duration::days(count - n);
            IndexRecord::new(id, title, author)
                .with_dates(created, changed)
                .with_tags(tags)
                .with_links(links.iter().copied())
        })
        .collect()
}

/// In-memory index for tests
///
/// # Examples
/// ```ignore
/// let index = TestIndex::seeded();
/// assert_eq!(index.count().unwrap(), 5);
/// ```
pub struct TestIndex {
    index: NoteIndex,
}

impl TestIndex {
    /// Empty index with the full schema
    ///
    /// # Panics
    /// Panics if SQLite cannot open an in-memory database.
    #[must_use]
    pub fn new() -> Self {
        let index = NoteIndex::open_in_memory().expect("Failed to open in-memory index");
        Self { index }
    }

    /// Index holding [`SAMPLE_NOTES`]
    ///
    /// # Panics
    /// Panics if seeding fails.
    #[must_use]
    pub fn seeded() -> Self {
        let mut test_index = Self::new();
        for record in sample_records() {
            test_index
                .index
                .add_note(&record)
                .expect("Failed to seed test index");
        }
        test_index
    }

    /// Get a reference to the underlying index
    #[must_use]
    pub const fn index(&self) -> &NoteIndex {
        &self.index
    }
}

impl Default for TestIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for TestIndex {
    type Target = NoteIndex;

    fn deref(&self) -> &Self::Target {
        &self.index
    }
}

impl DerefMut for TestIndex {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.index
    }
}

/// Temporary vault directory, removed on drop
pub struct TestVault {
    dir: TempDir,
}

impl TestVault {
    /// # Panics
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp vault"),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Location of the vault's index file
    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        self.dir.path().join(DEFAULT_INDEX_FILE)
    }

    /// Create the index file and fill it with [`SAMPLE_NOTES`]
    ///
    /// # Panics
    /// Panics if the index cannot be created or seeded.
    pub fn seed(&self) -> PathBuf {
        let path = self.index_path();
        let mut index = NoteIndex::create(&path, false).expect("Failed to create test index");
        for record in sample_records() {
            index.add_note(&record).expect("Failed to seed test index");
        }
        path
    }
}

impl Default for TestVault {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_index() {
        let index = TestIndex::seeded();
        assert_eq!(index.count().unwrap(), SAMPLE_NOTES.len());
    }

    #[test]
    fn test_sample_dates_are_ordered() {
        let records = sample_records();
        assert!(records.windows(2).all(|w| w[0].created < w[1].created));
        assert!(records.windows(2).all(|w| w[0].changed > w[1].changed));
    }

    #[test]
    fn test_vault_seed_on_disk() {
        let vault = TestVault::new();
        let path = vault.seed();
        assert!(path.exists());
        assert_eq!(NoteIndex::open(&path).unwrap().count().unwrap(), 5);
    }
}
