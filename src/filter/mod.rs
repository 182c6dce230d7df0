//! Filter model for note lookups
//!
//! A [`Filter`] is the compiled form of a search query: for every index
//! column it holds an ordered, duplicate-free list of [`Pattern`]s.
//!
//! # Combination rules
//!
//! - Non-negated patterns on the same column are OR-ed
//! - Negated patterns on the same column are AND-NOT-ed
//! - Different columns are AND-ed
//! - An empty filter matches every note
//!
//! Patterns use LIKE syntax: `%` matches any run of characters and `\`
//! escapes a literal `%`, `_` or `\`. User text is always escaped before it
//! is wrapped, so a typed `%` never widens a match.

pub mod compiler;
pub mod error;

pub use compiler::{CompiledQuery, DEFAULT_LINK_CLOSE, DEFAULT_LINK_OPEN, QueryCompiler};
pub use error::FilterError;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Marker that starts a tag token and is kept in stored tags
pub const TAG_MARKER: char = '#';

/// Prefix marking a pattern or token as negated
pub const NEGATION_MARKER: char = '!';

/// Columns of the index a filter can constrain
///
/// Declaration order is the order predicates are emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Title,
    Id,
    Author,
    Tag,
    Link,
}

impl Column {
    /// All columns, in predicate order
    pub const ALL: [Self; 5] = [Self::Title, Self::Id, Self::Author, Self::Tag, Self::Link];

    /// Stable textual name of the column
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Id => "id",
            Self::Author => "author",
            Self::Tag => "tag",
            Self::Link => "link",
        }
    }

    /// Whether the column lives in a child table (many values per note)
    #[must_use]
    pub const fn is_multi_valued(self) -> bool {
        matches!(self, Self::Tag | Self::Link)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Column {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|column| column.as_str() == s)
            .ok_or_else(|| FilterError::UnknownColumn(s.to_string()))
    }
}

/// A single LIKE pattern, optionally negated
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    pub text: String,
    pub negated: bool,
}

impl Pattern {
    /// Create a pattern from raw LIKE text
    #[must_use]
    pub fn new(text: impl Into<String>, negated: bool) -> Self {
        Self {
            text: text.into(),
            negated,
        }
    }

    /// Substring containment pattern: `%body%`
    #[must_use]
    pub fn contains(body: &str, negated: bool) -> Self {
        Self::new(format!("%{}%", escape_like(body)), negated)
    }

    /// Tag pattern keeping the marker: `#%body%`
    #[must_use]
    pub fn tag(body: &str, negated: bool) -> Self {
        Self::new(format!("{TAG_MARKER}%{}%", escape_like(body)), negated)
    }

    /// Parse the `!`-prefixed form used by the search function arguments
    #[must_use]
    pub fn from_prefixed(raw: &str) -> Self {
        raw.strip_prefix(NEGATION_MARKER)
            .map_or_else(|| Self::new(raw, false), |rest| Self::new(rest, true))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "{NEGATION_MARKER}")?;
        }
        f.write_str(&self.text)
    }
}

/// Escape LIKE metacharacters so `text` only ever matches itself
#[must_use]
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Compiled query: column -> ordered set of patterns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    columns: BTreeMap<Column, Vec<Pattern>>,
}

impl Filter {
    /// Create an empty filter (matches everything)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pattern to a column, ignoring exact duplicates
    ///
    /// Returns `true` if the pattern was new.
    pub fn push(&mut self, column: Column, pattern: Pattern) -> bool {
        let patterns = self.columns.entry(column).or_default();
        if patterns.contains(&pattern) {
            return false;
        }
        patterns.push(pattern);
        true
    }

    /// Builder-style [`Filter::push`]
    #[must_use]
    pub fn with(mut self, column: Column, pattern: Pattern) -> Self {
        self.push(column, pattern);
        self
    }

    /// Patterns for a column, in insertion order
    #[must_use]
    pub fn patterns(&self, column: Column) -> &[Pattern] {
        self.columns.get(&column).map_or(&[], Vec::as_slice)
    }

    /// Iterate over populated columns in predicate order
    pub fn iter(&self) -> impl Iterator<Item = (Column, &[Pattern])> {
        self.columns
            .iter()
            .filter(|(_, patterns)| !patterns.is_empty())
            .map(|(column, patterns)| (*column, patterns.as_slice()))
    }

    /// True when no column carries a pattern
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.values().all(Vec::is_empty)
    }

    /// Total number of patterns across all columns
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.values().map(Vec::len).sum()
    }
}

/// Arguments of the index search function
///
/// Each list holds raw LIKE patterns; a leading `!` marks negation.
/// `None` means "no constraint on that column".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchArgs {
    pub title: Option<Vec<String>>,
    pub id: Option<Vec<String>>,
    pub author: Option<Vec<String>>,
    pub tag: Option<Vec<String>>,
    pub link: Option<Vec<String>>,
}

impl From<SearchArgs> for Filter {
    fn from(args: SearchArgs) -> Self {
        let mut filter = Self::new();
        let lists = [
            (Column::Title, args.title),
            (Column::Id, args.id),
            (Column::Author, args.author),
            (Column::Tag, args.tag),
            (Column::Link, args.link),
        ];
        for (column, list) in lists {
            for raw in list.into_iter().flatten() {
                filter.push(column, Pattern::from_prefixed(&raw));
            }
        }
        filter
    }
}
