//! Clause building blocks held by a [`QueryBuilder`].

use std::fmt;
use std::str::FromStr;

use crate::aggregation::Aggregation;
use crate::error::{QueryError, Result};

use super::QueryBuilder;

fn is_select_text(text: &str) -> bool {
    text.trim_start()
        .get(..7)
        .is_some_and(|head| head.eq_ignore_ascii_case("SELECT "))
}

/// An expression in the select list.
#[derive(Debug, Clone)]
pub enum SelectExpr {
    /// A column name, `*`, `alias.*` or a raw expression such as `COUNT(*)`.
    Column(String),
    /// An aggregate.
    Aggregation(Aggregation),
    /// A sub-query, rendered in parentheses.
    Query(Box<QueryBuilder>),
    /// Pre-rendered sub-query text, rendered in parentheses.
    RawQuery(String),
}

impl SelectExpr {
    /// Creates a pre-rendered sub-query expression.
    pub fn raw_query(sql: impl Into<String>) -> Self {
        Self::RawQuery(sql.into())
    }
}

impl From<&str> for SelectExpr {
    /// Text starting with `SELECT` is taken as a sub-query.
    fn from(text: &str) -> Self {
        if is_select_text(text) {
            Self::RawQuery(text.trim().to_string())
        } else {
            Self::Column(text.trim().to_string())
        }
    }
}

impl From<String> for SelectExpr {
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}

impl From<Aggregation> for SelectExpr {
    fn from(aggregation: Aggregation) -> Self {
        Self::Aggregation(aggregation)
    }
}

impl From<QueryBuilder> for SelectExpr {
    fn from(query: QueryBuilder) -> Self {
        Self::Query(Box::new(query))
    }
}

/// One entry of the select list.
#[derive(Debug, Clone)]
pub struct SelectColumn {
    /// The selected expression.
    pub expr: SelectExpr,
    /// Output alias.
    pub alias: Option<String>,
}

/// A table reference in FROM or JOIN.
#[derive(Debug, Clone)]
pub enum Source {
    /// A table name, optionally schema-qualified.
    Table(String),
    /// A sub-query, rendered in parentheses.
    Query(Box<QueryBuilder>),
    /// Pre-rendered sub-query text, rendered in parentheses.
    Raw(String),
}

impl From<&str> for Source {
    /// Text starting with `SELECT` is taken as a sub-query.
    fn from(text: &str) -> Self {
        if is_select_text(text) {
            Self::Raw(text.trim().to_string())
        } else {
            Self::Table(text.trim().to_string())
        }
    }
}

impl From<String> for Source {
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}

impl From<QueryBuilder> for Source {
    fn from(query: QueryBuilder) -> Self {
        Self::Query(Box::new(query))
    }
}

/// A FROM entry.
#[derive(Debug, Clone)]
pub struct TableSource {
    /// The table or sub-query.
    pub source: Source,
    /// Alias.
    pub alias: Option<String>,
}

/// Join types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    /// `INNER JOIN`
    Inner,
    /// `LEFT JOIN`
    Left,
    /// `RIGHT JOIN`
    Right,
    /// `FULL JOIN`
    Full,
    /// `CROSS JOIN`
    Cross,
}

impl JoinType {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
            Self::Cross => "CROSS JOIN",
        }
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for JoinType {
    type Err = QueryError;

    /// Accepts `LEFT`, `left join`, `LEFT OUTER JOIN` and so on.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase();
        let words: Vec<&str> = normalized
            .split_whitespace()
            .filter(|word| *word != "JOIN" && *word != "OUTER")
            .collect();
        match words.as_slice() {
            [] | ["INNER"] => Ok(Self::Inner),
            ["LEFT"] => Ok(Self::Left),
            ["RIGHT"] => Ok(Self::Right),
            ["FULL"] => Ok(Self::Full),
            ["CROSS"] => Ok(Self::Cross),
            _ => Err(QueryError::InvalidFilter(format!("unknown join type '{s}'"))),
        }
    }
}

/// The ON condition of a join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOn {
    /// No condition.
    None,
    /// Column equalities, joined with `AND`.
    Columns(Vec<(String, String)>),
    /// Raw condition text; may use `[[column]]` placeholders.
    Raw(String),
}

impl JoinOn {
    /// Returns true if there is nothing to render.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Columns(pairs) => pairs.is_empty(),
            Self::Raw(sql) => sql.trim().is_empty(),
        }
    }
}

impl From<&str> for JoinOn {
    fn from(sql: &str) -> Self {
        Self::Raw(sql.to_string())
    }
}

impl From<String> for JoinOn {
    fn from(sql: String) -> Self {
        Self::Raw(sql)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for JoinOn {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self::Columns(
            pairs
                .into_iter()
                .map(|(left, right)| (left.to_string(), right.to_string()))
                .collect(),
        )
    }
}

impl From<Vec<(String, String)>> for JoinOn {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self::Columns(pairs)
    }
}

/// A JOIN clause.
#[derive(Debug, Clone)]
pub struct Join {
    /// Join type.
    pub kind: JoinType,
    /// Joined table or sub-query.
    pub target: Source,
    /// ON condition.
    pub on: JoinOn,
    /// Alias of the joined source.
    pub alias: Option<String>,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl Direction {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// What an ORDER BY entry sorts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderExpr {
    /// A column or raw expression.
    Column(String),
    /// The dialect's random function.
    Random,
}

/// An ORDER BY entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Sort expression.
    pub expr: OrderExpr,
    /// Sort direction.
    pub direction: Direction,
    /// Appended verbatim after the direction, e.g. `NULLS LAST`.
    pub modifier: Option<String>,
}

impl OrderBy {
    /// Parses `"col"`, `"-col"` (descending) or `"col DESC"`.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(column) = text.strip_prefix('-') {
            return Self::column(column.trim(), Direction::Desc);
        }
        if let Some((column, direction)) = text.rsplit_once(char::is_whitespace) {
            if direction.eq_ignore_ascii_case("DESC") {
                return Self::column(column.trim(), Direction::Desc);
            }
            if direction.eq_ignore_ascii_case("ASC") {
                return Self::column(column.trim(), Direction::Asc);
            }
        }
        Self::column(text, Direction::Asc)
    }

    fn column(column: &str, direction: Direction) -> Self {
        Self {
            expr: OrderExpr::Column(column.to_string()),
            direction,
            modifier: None,
        }
    }
}

/// The statement a builder renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Nothing set yet; renders as SELECT.
    Uninitialized,
    /// `SELECT`
    Select,
    /// `INSERT`
    Insert,
    /// `UPDATE`
    Update,
    /// `DELETE`
    Delete,
    /// `CREATE TABLE`
    CreateTable,
    /// `ALTER TABLE` and other changes to an existing table.
    AlterTable,
    /// `DROP TABLE`
    DropTable,
    /// `TRUNCATE TABLE`
    TruncateTable,
    /// `CREATE INDEX`
    CreateIndex,
    /// `DROP INDEX`
    DropIndex,
    /// Sequence resets and integrity-check toggles.
    Maintenance,
}

/// Splits a select list on top-level commas, leaving commas inside
/// parentheses and quotes alone.
pub(crate) fn split_select_list(list: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0_usize;
    let mut quote: Option<char> = None;
    for c in list.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    parts.push(current.trim().to_string());
                    current.clear();
                    continue;
                }
                _ => {}
            },
        }
        current.push(c);
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts.retain(|part| !part.is_empty());
    parts
}
