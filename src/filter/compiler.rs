//! Query compiler: raw finder input -> [`Filter`]
//!
//! Query text mixes free text with two kinds of inline tokens:
//!
//! - **links**: `[[target]]` (delimiters configurable), optionally `![[target]]`
//! - **tags**: `#work`, negated as `!#draft` or `#!draft`
//!
//! Tokens are cut out of the text and become patterns on the `link` and
//! `tag` columns. Whatever is left over (the residual) is the free-text
//! filter on `title`.
//!
//! ```
//! use zettel::filter::{Column, Pattern, QueryCompiler};
//!
//! let compiled = QueryCompiler::default().compile("meeting #work");
//! assert_eq!(compiled.residual, "meeting");
//! assert_eq!(compiled.filter.patterns(Column::Title), &[Pattern::new("%meeting%", false)]);
//! assert_eq!(compiled.filter.patterns(Column::Tag), &[Pattern::new("#%work%", false)]);
//! ```

use super::error::FilterError;
use super::{Column, Filter, Pattern};
use regex::{Captures, Regex};

/// Default opening link delimiter
pub const DEFAULT_LINK_OPEN: &str = "[[";
/// Default closing link delimiter
pub const DEFAULT_LINK_CLOSE: &str = "]]";

/// Result of compiling query text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    /// Structured filter
    pub filter: Filter,
    /// Query text with every token removed, trimmed
    pub residual: String,
}

/// Compiles query text into filters
///
/// Holds the token regexes so they are built once per session rather than
/// once per keystroke. Compiling is pure: the same text always produces the
/// same [`CompiledQuery`].
#[derive(Debug, Clone)]
pub struct QueryCompiler {
    link: Regex,
    tag: Regex,
}

impl QueryCompiler {
    /// Create a compiler for the given link delimiters
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidDelimiter` if either delimiter is empty.
    pub fn new(open: &str, close: &str) -> Result<Self, FilterError> {
        if open.is_empty() {
            return Err(FilterError::InvalidDelimiter(open.to_string()));
        }
        if close.is_empty() {
            return Err(FilterError::InvalidDelimiter(close.to_string()));
        }

        // Groups: 1 = leading whitespace, 2 = negation, 3 = body (non-greedy)
        let link = Regex::new(&format!(
            r"(\s?)(!?){}(.*?){}",
            regex::escape(open),
            regex::escape(close)
        ))?;
        // Groups: 1 = leading whitespace or start, 2 = negation before marker,
        // 3 = negation after marker, 4 = body
        let tag = Regex::new(r"(^|\s)(!?)#(!?)(\S*)")?;

        Ok(Self { link, tag })
    }

    /// Compile query text into a filter plus residual free text
    #[must_use]
    pub fn compile(&self, text: &str) -> CompiledQuery {
        let mut filter = Filter::new();

        // Links go first so a `#` inside a link body stays part of the link
        let without_links = strip_tokens(&self.link, text, |caps| {
            let body = caps.get(3).map_or("", |m| m.as_str()).trim();
            if body.is_empty() {
                return false;
            }
            let negated = caps.get(2).is_some_and(|m| !m.as_str().is_empty());
            filter.push(Column::Link, Pattern::contains(body, negated));
            true
        });

        let without_tags = strip_tokens(&self.tag, &without_links, |caps| {
            let body = caps.get(4).map_or("", |m| m.as_str());
            // A bare marker is a tag still being typed: drop it, match nothing yet
            if !body.is_empty() {
                let negated = [2, 3]
                    .into_iter()
                    .any(|group| caps.get(group).is_some_and(|m| !m.as_str().is_empty()));
                filter.push(Column::Tag, Pattern::tag(body, negated));
            }
            true
        });

        let residual = without_tags.trim().to_string();
        if !residual.is_empty() {
            filter.push(Column::Title, Pattern::contains(&residual, false));
        }

        CompiledQuery { filter, residual }
    }
}

impl Default for QueryCompiler {
    fn default() -> Self {
        Self::new(DEFAULT_LINK_OPEN, DEFAULT_LINK_CLOSE)
            .unwrap_or_else(|e| unreachable!("default link delimiters are valid: {e}"))
    }
}

/// Compile with the default `[[`/`]]` link delimiters
#[must_use]
pub fn compile(text: &str) -> CompiledQuery {
    QueryCompiler::default().compile(text)
}

/// Remove every match accepted by `on_token` from `text`
///
/// A match may include the whitespace character in front of the token.
/// Whenever the text on both sides of a removed match is non-whitespace, a
/// single space is put in its place so the neighbours do not merge into a
/// new token.
fn strip_tokens(re: &Regex, text: &str, mut on_token: impl FnMut(&Captures<'_>) -> bool) -> String {
    let mut residual = String::with_capacity(text.len());
    let mut last = 0;

    for caps in re.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if !on_token(&caps) {
            continue;
        }

        residual.push_str(&text[last..whole.start()]);
        let glued_before = residual.chars().next_back().is_some_and(|c| !c.is_whitespace());
        let glued_after = text[whole.end()..]
            .chars()
            .next()
            .is_some_and(|c| !c.is_whitespace());
        if glued_before && glued_after {
            residual.push(' ');
        }
        last = whole.end();
    }

    residual.push_str(&text[last..]);
    residual
}
