//! Value types stored in and returned by the index

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::filter::TAG_MARKER;

/// Stable note identifier
///
/// Ids are opaque to the index; the archive uses creation timestamps such as
/// `20240101120000`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NoteId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for NoteId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One row of the finder's result list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteHit {
    pub id: NoteId,
    pub title: String,
}

impl NoteHit {
    #[must_use]
    pub fn new(id: impl Into<NoteId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Full metadata of one indexed note
///
/// Tags always carry their leading `#`; [`IndexRecord::with_tags`] adds it
/// when missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexRecord {
    pub id: NoteId,
    pub title: String,
    pub author: String,
    pub created: DateTime<Utc>,
    pub changed: DateTime<Utc>,
    pub tags: BTreeSet<String>,
    pub links: BTreeSet<String>,
}

impl IndexRecord {
    /// Create a record stamped with the current time and no tags or links
    #[must_use]
    pub fn new(id: impl Into<NoteId>, title: impl Into<String>, author: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            created: now,
            changed: now,
            tags: BTreeSet::new(),
            links: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = tags.into_iter().map(|t| normalize_tag(t.as_ref())).collect();
        self
    }

    #[must_use]
    pub fn with_links<I, S>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.links = links.into_iter().map(Into::into).collect();
        self
    }

    /// Set both timestamps
    #[must_use]
    pub fn with_dates(mut self, created: DateTime<Utc>, changed: DateTime<Utc>) -> Self {
        self.created = created;
        self.changed = changed;
        self
    }
}

/// Prefix `#` unless already present
#[must_use]
pub fn normalize_tag(tag: &str) -> String {
    let tag = tag.trim();
    if tag.starts_with(TAG_MARKER) {
        tag.to_string()
    } else {
        format!("{TAG_MARKER}{tag}")
    }
}

/// Stored date format: RFC 3339 in UTC, so text order is time order
#[must_use]
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Inverse of [`format_date`]
///
/// # Errors
///
/// Returns the chrono parse error when `text` is not RFC 3339.
pub fn parse_date(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(text).map(|date| date.with_timezone(&Utc))
}
