//! Lookup Translator: [`Filter`] -> parameterised SQL over the index
//!
//! Every lookup runs against one outer-joined view of the three tables:
//!
//! ```text
//! zettelkasten AS z
//!   LEFT JOIN tags  AS t ON t.zk_id = z.zk_id
//!   LEFT JOIN links AS l ON l.zk_id = z.zk_id
//! ```
//!
//! A note therefore appears once per tag × link combination; result rows are
//! `DISTINCT` to collapse those duplicates. Patterns are always bound as
//! parameters, so nothing typed by the user ever becomes SQL text.

use super::{NoteIndex, column_text};
use super::error::{IndexError, IndexResult};
use super::schema::{LINKS_TABLE, TAGS_TABLE};
use super::types::{NoteHit, NoteId};
use crate::filter::{Column, Filter, Pattern, SearchArgs};
use rusqlite::params_from_iter;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const FROM_VIEW: &str = "FROM zettelkasten AS z \
LEFT JOIN tags AS t ON t.zk_id = z.zk_id \
LEFT JOIN links AS l ON l.zk_id = z.zk_id";

const ESCAPE: &str = "ESCAPE '\\'";

/// Expression for a filter column inside the joined view
const fn column_expr(column: Column) -> &'static str {
    match column {
        Column::Title => "z.title",
        Column::Id => "z.zk_id",
        Column::Author => "z.author",
        Column::Tag => "t.tag",
        Column::Link => "l.link",
    }
}

/// `(table, value column)` for columns stored in a child table
const fn child_table(column: Column) -> Option<(&'static str, &'static str)> {
    match column {
        Column::Tag => Some((TAGS_TABLE, "tag")),
        Column::Link => Some((LINKS_TABLE, "link")),
        Column::Title | Column::Id | Column::Author => None,
    }
}

/// Columns results can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortColumn {
    Title,
    Id,
    Author,
    Created,
    Changed,
}

impl SortColumn {
    pub const ALL: [Self; 5] = [
        Self::Title,
        Self::Id,
        Self::Author,
        Self::Created,
        Self::Changed,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Id => "id",
            Self::Author => "author",
            Self::Created => "created",
            Self::Changed => "changed",
        }
    }

    const fn expr(self) -> &'static str {
        match self {
            Self::Title => "z.title",
            Self::Id => "z.zk_id",
            Self::Author => "z.author",
            Self::Created => "z.creation_date",
            Self::Changed => "z.last_changed",
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortColumn {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|column| column.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| IndexError::InvalidInput(format!("unknown sort column: {s}")))
    }
}

/// Requested result order
///
/// Ties, and the unsorted case, always fall back to ascending id so identical
/// lookups return identical orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub column: Option<SortColumn>,
    pub descending: bool,
}

impl SortSpec {
    #[must_use]
    pub const fn new(column: Option<SortColumn>, descending: bool) -> Self {
        Self { column, descending }
    }

    /// Ascending order on `column`
    #[must_use]
    pub const fn by(column: SortColumn) -> Self {
        Self::new(Some(column), false)
    }

    /// Same column, reversed direction
    #[must_use]
    pub const fn descending(mut self) -> Self {
        self.descending = true;
        self
    }

    fn order_by(&self) -> String {
        match self.column {
            Some(SortColumn::Id) => {
                format!("ORDER BY z.zk_id {}", direction(self.descending))
            }
            Some(column) => format!(
                "ORDER BY {} {}, z.zk_id ASC",
                column.expr(),
                direction(self.descending)
            ),
            None => "ORDER BY z.zk_id ASC".to_string(),
        }
    }
}

const fn direction(descending: bool) -> &'static str {
    if descending { "DESC" } else { "ASC" }
}

/// Fields a lookup can project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Id,
    Title,
    Author,
    Created,
    Changed,
    Tag,
    Link,
}

impl Field {
    pub const ALL: [Self; 7] = [
        Self::Id,
        Self::Title,
        Self::Author,
        Self::Created,
        Self::Changed,
        Self::Tag,
        Self::Link,
    ];

    /// Projection used for the finder's result list
    pub const DISPLAY: [Self; 2] = [Self::Id, Self::Title];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Author => "author",
            Self::Created => "created",
            Self::Changed => "changed",
            Self::Tag => "tag",
            Self::Link => "link",
        }
    }

    const fn expr(self) -> &'static str {
        match self {
            Self::Id => "z.zk_id",
            Self::Title => "z.title",
            Self::Author => "z.author",
            Self::Created => "z.creation_date",
            Self::Changed => "z.last_changed",
            Self::Tag => "t.tag",
            Self::Link => "l.link",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| IndexError::InvalidInput(format!("unknown field: {s}")))
    }
}

/// A translated lookup, ready to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub sql: String,
    pub params: Vec<String>,
    pub fields: Vec<Field>,
}

impl QueryPlan {
    /// Translate a filter into SQL plus bound parameters
    ///
    /// # Arguments
    /// * `filter` - Compiled filter; an empty filter selects every note
    /// * `sort` - Requested order
    /// * `fields` - Projection, must include [`Field::Id`]
    ///
    /// # Errors
    ///
    /// Returns `IndexError::InvalidInput` if `fields` does not contain `Field::Id`.
    pub fn build(filter: &Filter, sort: &SortSpec, fields: &[Field]) -> IndexResult<Self> {
        if !fields.contains(&Field::Id) {
            return Err(IndexError::InvalidInput(
                "projection must include the id field".to_string(),
            ));
        }

        let mut projection: Vec<Field> = Vec::with_capacity(fields.len());
        for field in fields {
            if !projection.contains(field) {
                projection.push(*field);
            }
        }

        let mut select: Vec<&str> = projection.iter().map(|field| field.expr()).collect();
        if let Some(column) = sort.column
            && !select.contains(&column.expr())
        {
            select.push(column.expr());
        }

        let mut predicates = Vec::new();
        let mut params = Vec::new();
        for (column, patterns) in filter.iter() {
            push_predicates(column, patterns, &mut predicates, &mut params);
        }

        let mut sql = format!("SELECT DISTINCT {} {FROM_VIEW}", select.join(", "));
        if !predicates.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&predicates.join(" AND "));
        }
        sql.push(' ');
        sql.push_str(&sort.order_by());

        Ok(Self {
            sql,
            params,
            fields: projection,
        })
    }
}

/// Emit the predicate group for one column
///
/// Positive patterns become one OR group. Negated patterns on scalar columns
/// are `NOT LIKE`; on child tables they exclude the whole note, since the
/// joined row for another tag would otherwise still match.
fn push_predicates(
    column: Column,
    patterns: &[Pattern],
    predicates: &mut Vec<String>,
    params: &mut Vec<String>,
) {
    let expr = column_expr(column);

    let positive: Vec<&Pattern> = patterns.iter().filter(|p| !p.negated).collect();
    if !positive.is_empty() {
        let group: Vec<String> = positive
            .iter()
            .map(|_| format!("{expr} LIKE ? {ESCAPE}"))
            .collect();
        predicates.push(format!("({})", group.join(" OR ")));
        params.extend(positive.iter().map(|p| p.text.clone()));
    }

    for pattern in patterns.iter().filter(|p| p.negated) {
        let predicate = match child_table(column) {
            Some((table, value)) => format!(
                "z.zk_id NOT IN (SELECT zk_id FROM {table} WHERE {value} LIKE ? {ESCAPE})"
            ),
            None => format!("{expr} NOT LIKE ? {ESCAPE}"),
        };
        predicates.push(predicate);
        params.push(pattern.text.clone());
    }
}

/// One projected row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    values: Vec<(Field, Option<String>)>,
}

impl ResultRow {
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.values
            .iter()
            .find(|(f, _)| *f == field)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, Option<&str>)> {
        self.values
            .iter()
            .map(|(field, value)| (*field, value.as_deref()))
    }

    /// Id of the note this row belongs to
    #[must_use]
    pub fn id(&self) -> Option<NoteId> {
        self.get(Field::Id).map(NoteId::from)
    }

    fn into_hit(self) -> IndexResult<NoteHit> {
        let id = self
            .id()
            .ok_or_else(|| IndexError::InvalidInput("row without id".to_string()))?;
        let title = self.get(Field::Title).unwrap_or_default().to_string();
        Ok(NoteHit { id, title })
    }
}

impl Serialize for ResultRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (field, value) in &self.values {
            map.serialize_entry(field.as_str(), value)?;
        }
        map.end()
    }
}

impl NoteIndex {
    /// Run a translated lookup
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Unavailable` if the tables are gone or the index
    /// stayed locked past the busy timeout, or `IndexError::Sqlite` otherwise.
    pub fn execute(&self, plan: &QueryPlan) -> IndexResult<Vec<ResultRow>> {
        let mut stmt = self.conn().prepare(&plan.sql)?;
        let rows = stmt.query_map(params_from_iter(plan.params.iter()), |row| {
            let values = plan
                .fields
                .iter()
                .enumerate()
                .map(|(i, field)| column_text(row, i).map(|value| (*field, value)))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(ResultRow { values })
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }
}

/// The search function the finder consumes
///
/// Implemented by [`LookupTranslator`]; tests substitute canned sources.
pub trait NoteSource {
    /// Notes matching `filter`, as `(id, title)` rows in display order
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Unavailable` when there is no usable index.
    fn search(&self, filter: &Filter) -> IndexResult<Vec<NoteHit>>;
}

/// Executes filters against an injected index handle
#[derive(Debug, Clone, Copy)]
pub struct LookupTranslator<'a> {
    index: Option<&'a NoteIndex>,
    sort: SortSpec,
}

impl<'a> LookupTranslator<'a> {
    #[must_use]
    pub const fn new(index: &'a NoteIndex, sort: SortSpec) -> Self {
        Self {
            index: Some(index),
            sort,
        }
    }

    /// Translator without an index: every lookup fails with
    /// `IndexError::Unavailable`
    #[must_use]
    pub const fn detached(sort: SortSpec) -> Self {
        Self { index: None, sort }
    }

    #[must_use]
    pub const fn sort(&self) -> SortSpec {
        self.sort
    }

    fn index(&self) -> IndexResult<&'a NoteIndex> {
        self.index
            .ok_or_else(|| IndexError::Unavailable("no index has been opened".to_string()))
    }

    /// Rows for `filter` with an arbitrary projection, in the translator's order
    ///
    /// # Errors
    ///
    /// Returns `IndexError` if there is no index, the projection lacks `id`,
    /// or the lookup fails.
    pub fn rows(&self, filter: &Filter, fields: &[Field]) -> IndexResult<Vec<ResultRow>> {
        let index = self.index()?;
        let plan = QueryPlan::build(filter, &self.sort, fields)?;
        index.execute(&plan)
    }

    /// `(id, title)` rows for `filter` in the given order
    ///
    /// # Errors
    ///
    /// Returns `IndexError` if there is no index or the lookup fails.
    pub fn translate_and_execute(&self, filter: &Filter, sort: &SortSpec) -> IndexResult<Vec<NoteHit>> {
        let index = self.index()?;
        let plan = QueryPlan::build(filter, sort, &Field::DISPLAY)?;
        index
            .execute(&plan)?
            .into_iter()
            .map(ResultRow::into_hit)
            .collect()
    }

    /// Search with raw per-column pattern lists (`!` prefix = negated)
    ///
    /// # Errors
    ///
    /// Returns `IndexError` if there is no index, the projection lacks `id`,
    /// or the lookup fails.
    pub fn search_args(&self, args: SearchArgs, fields: &[Field]) -> IndexResult<Vec<ResultRow>> {
        self.rows(&Filter::from(args), fields)
    }
}

impl NoteSource for LookupTranslator<'_> {
    fn search(&self, filter: &Filter) -> IndexResult<Vec<NoteHit>> {
        self.translate_and_execute(filter, &self.sort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::compiler::compile;
    use crate::testing::TestIndex;

    fn ids(hits: &[NoteHit]) -> Vec<&str> {
        hits.iter().map(|hit| hit.id.as_str()).collect()
    }

    fn find(index: &NoteIndex, query: &str) -> Vec<String> {
        let hits = LookupTranslator::new(index, SortSpec::default())
            .search(&compile(query).filter)
            .unwrap();
        ids(&hits).into_iter().map(String::from).collect()
    }

    #[test]
    fn test_plan_for_empty_filter() {
        let plan = QueryPlan::build(&Filter::new(), &SortSpec::default(), &Field::DISPLAY).unwrap();
        assert_eq!(
            plan.sql,
            format!("SELECT DISTINCT z.zk_id, z.title {FROM_VIEW} ORDER BY z.zk_id ASC")
        );
        assert!(plan.params.is_empty());
    }

    #[test]
    fn test_plan_groups_and_params() {
        let filter = compile("meeting #work #idea !#draft").filter;
        let plan = QueryPlan::build(&filter, &SortSpec::default(), &Field::DISPLAY).unwrap();

        assert!(plan.sql.contains("WHERE (z.title LIKE ? ESCAPE '\\')"));
        assert!(plan.sql.contains("(t.tag LIKE ? ESCAPE '\\' OR t.tag LIKE ? ESCAPE '\\')"));
        assert!(plan.sql.contains(
            "z.zk_id NOT IN (SELECT zk_id FROM tags WHERE tag LIKE ? ESCAPE '\\')"
        ));
        assert_eq!(plan.params, vec!["%meeting%", "#%work%", "#%idea%", "#%draft%"]);
    }

    #[test]
    fn test_plan_never_contains_user_text() {
        let filter = compile("'; DROP TABLE tags; -- #x'y [[a\"b]]").filter;
        let plan = QueryPlan::build(&filter, &SortSpec::default(), &Field::DISPLAY).unwrap();
        assert!(!plan.sql.contains("DROP"));
        assert!(!plan.sql.contains("x'y"));
        assert_eq!(plan.params.len(), 3);
    }

    #[test]
    fn test_plan_negated_scalar_column() {
        let filter = Filter::new().with(Column::Author, Pattern::contains("ada", true));
        let plan = QueryPlan::build(&filter, &SortSpec::default(), &Field::DISPLAY).unwrap();
        assert!(plan.sql.contains("WHERE z.author NOT LIKE ? ESCAPE '\\'"));
    }

    #[test]
    fn test_plan_requires_id() {
        let err = QueryPlan::build(&Filter::new(), &SortSpec::default(), &[Field::Title]).unwrap_err();
        assert!(matches!(err, IndexError::InvalidInput(_)));
    }

    #[test]
    fn test_plan_sort_column_selected() {
        let sort = SortSpec::by(SortColumn::Changed).descending();
        let plan = QueryPlan::build(&Filter::new(), &sort, &Field::DISPLAY).unwrap();
        assert!(plan.sql.starts_with("SELECT DISTINCT z.zk_id, z.title, z.last_changed "));
        assert!(plan.sql.ends_with("ORDER BY z.last_changed DESC, z.zk_id ASC"));
        assert_eq!(plan.fields, Field::DISPLAY.to_vec());
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let index = TestIndex::seeded();
        assert_eq!(find(&index, ""), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_title_substring() {
        let index = TestIndex::seeded();
        assert_eq!(find(&index, "meeting"), vec!["1", "2"]);
    }

    #[test]
    fn test_title_and_tag() {
        let index = TestIndex::seeded();
        assert_eq!(find(&index, "meeting #work"), vec!["1", "2"]);
        assert_eq!(find(&index, "meeting #meeting"), vec!["1"]);
    }

    #[test]
    fn test_negated_tag_excludes_whole_note() {
        let index = TestIndex::seeded();
        // Note 2 is tagged #work and #draft: the #work row must not sneak it in
        assert_eq!(find(&index, "#work !#draft"), vec!["1"]);
        assert_eq!(find(&index, "!#draft"), vec!["1", "3", "4", "5"]);
    }

    #[test]
    fn test_tags_are_or_ed() {
        let index = TestIndex::seeded();
        assert_eq!(find(&index, "#math #idea"), vec!["3", "5"]);
    }

    #[test]
    fn test_links() {
        let index = TestIndex::seeded();
        assert_eq!(find(&index, "[[euler]]"), vec!["3"]);
        assert_eq!(find(&index, "![[Euler]]"), vec!["1", "2", "4", "5"]);
    }

    #[test]
    fn test_negated_author() {
        let index = TestIndex::seeded();
        let filter = Filter::new().with(Column::Author, Pattern::contains("ada", true));
        let hits = LookupTranslator::new(&index, SortSpec::default())
            .search(&filter)
            .unwrap();
        assert_eq!(ids(&hits), vec!["2", "4"]);
    }

    #[test]
    fn test_typed_wildcards_are_literal() {
        let index = TestIndex::seeded();
        assert_eq!(find(&index, "100%"), vec!["5"]);
        assert!(find(&index, "_").is_empty());
    }

    #[test]
    fn test_join_duplicates_collapse() {
        let index = TestIndex::seeded();
        // Note 3 has one tag and two links: still a single row
        assert_eq!(find(&index, "graph"), vec!["3"]);
    }

    #[test]
    fn test_sort_by_title() {
        let index = TestIndex::seeded();
        let translator = LookupTranslator::new(&index, SortSpec::by(SortColumn::Title));
        let hits = translator.search(&Filter::new()).unwrap();
        assert_eq!(ids(&hits), vec!["5", "3", "1", "4", "2"]);

        let hits = translator
            .translate_and_execute(&Filter::new(), &SortSpec::by(SortColumn::Title).descending())
            .unwrap();
        assert_eq!(ids(&hits), vec!["2", "4", "1", "3", "5"]);
    }

    #[test]
    fn test_sort_by_dates() {
        let index = TestIndex::seeded();
        let translator = LookupTranslator::new(&index, SortSpec::default());

        let created = translator
            .translate_and_execute(&Filter::new(), &SortSpec::by(SortColumn::Created).descending())
            .unwrap();
        assert_eq!(ids(&created), vec!["5", "4", "3", "2", "1"]);

        let changed = translator
            .translate_and_execute(&Filter::new(), &SortSpec::by(SortColumn::Changed))
            .unwrap();
        assert_eq!(ids(&changed), vec!["5", "4", "3", "2", "1"]);
    }

    #[test]
    fn test_ties_break_on_id() {
        let index = TestIndex::seeded();
        let translator = LookupTranslator::new(&index, SortSpec::by(SortColumn::Author).descending());
        let hits = translator.search(&Filter::new()).unwrap();
        assert_eq!(ids(&hits), vec!["2", "4", "1", "3", "5"]);
    }

    #[test]
    fn test_detached_translator_is_unavailable() {
        let translator = LookupTranslator::detached(SortSpec::default());
        let err = translator.search(&Filter::new()).unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_dropped_tables_are_unavailable() {
        let index = TestIndex::seeded();
        index.conn().execute_batch("DROP TABLE links;").unwrap();
        let err = LookupTranslator::new(&index, SortSpec::default())
            .search(&Filter::new())
            .unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_adding_characters_never_widens() {
        let index = TestIndex::seeded();
        let mut previous = usize::MAX;
        for query in ["m", "me", "mee", "meet", "meeti", "meeting", "meeting "] {
            let count = find(&index, query).len();
            assert!(count <= previous, "{query:?} grew the result set");
            previous = count;
        }
    }

    #[test]
    fn test_search_args_projection() {
        let index = TestIndex::seeded();
        let translator = LookupTranslator::new(&index, SortSpec::default());
        let args = SearchArgs {
            author: Some(vec!["ada".into()]),
            tag: Some(vec!["!#work".into()]),
            ..Default::default()
        };

        let rows = translator
            .search_args(args, &[Field::Id, Field::Title, Field::Tag])
            .unwrap();
        let pairs: Vec<(Option<&str>, Option<&str>)> = rows
            .iter()
            .map(|row| (row.get(Field::Id), row.get(Field::Tag)))
            .collect();
        assert_eq!(pairs, vec![(Some("3"), Some("#math")), (Some("5"), Some("#idea"))]);
    }

    #[test]
    fn test_result_row_serializes_as_map() {
        let index = TestIndex::seeded();
        let rows = LookupTranslator::new(&index, SortSpec::default())
            .rows(&compile("shopping").filter, &[Field::Id, Field::Title, Field::Tag])
            .unwrap();
        let json = serde_json::to_string(&rows).unwrap();
        assert_eq!(json, r#"[{"id":"4","title":"Shopping list","tag":null}]"#);
    }

    #[test]
    fn test_parse_sort_and_field() {
        assert_eq!("Created".parse::<SortColumn>().unwrap(), SortColumn::Created);
        assert!("size".parse::<SortColumn>().is_err());
        assert_eq!("link".parse::<Field>().unwrap(), Field::Link);
    }
}
