//! SQL values, filter operands and parameter collection.
//!
//! [`SqlValue`] is a single literal. [`FilterValue`] is what a condition leaf
//! compares against: a literal, a list of literals, or a sub-query.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};

use crate::adapter::Adapter;
use crate::builder::QueryBuilder;

/// A SQL literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time without a zone.
    DateTime(NaiveDateTime),
}

impl SqlValue {
    /// Returns true if the value is NULL.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the text content, if this is a text value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an integer, converting numeric text.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Interprets the value as a boolean flag.
    ///
    /// Integers are true when non-zero; text accepts the usual spellings.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int(n) => Some(*n != 0),
            Self::Text(s) => match s.to_ascii_lowercase().as_str() {
                "1" | "true" | "t" | "yes" | "y" | "on" => Some(true),
                "0" | "false" | "f" | "no" | "n" | "off" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Renders the value as plain text, without quoting.
    ///
    /// Used where a value becomes part of a pattern, e.g. `LIKE '%text%'`.
    #[must_use]
    pub fn to_plain_string(&self) -> Option<String> {
        match self {
            Self::Null | Self::Blob(_) => None,
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(n) => Some(n.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Text(s) => Some(s.clone()),
            Self::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            Self::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Blob(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

macro_rules! impl_to_sql_value {
    ($variant:ident: $($t:ty),*) => {
        $(
            impl ToSqlValue for $t {
                fn to_sql_value(self) -> SqlValue {
                    SqlValue::$variant(self.into())
                }
            }
        )*
    };
}

impl_to_sql_value!(Bool: bool);
impl_to_sql_value!(Int: i64, i32, i16, i8, u32, u16, u8);
impl_to_sql_value!(Float: f64, f32);
impl_to_sql_value!(Text: String, &str, &String);
impl_to_sql_value!(Blob: Vec<u8>, &[u8]);
impl_to_sql_value!(Date: NaiveDate);
impl_to_sql_value!(DateTime: NaiveDateTime);

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl<Tz: TimeZone> ToSqlValue for DateTime<Tz> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::DateTime(self.naive_utc())
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

/// The right-hand side of a condition leaf.
#[derive(Debug, Clone)]
pub enum FilterValue {
    /// A single literal.
    Value(SqlValue),
    /// A list of literals, for `in` and `range`.
    List(Vec<SqlValue>),
    /// A sub-query, copied in and rendered in parentheses at compile time.
    Query(Box<QueryBuilder>),
    /// Pre-rendered sub-query text, rendered in parentheses.
    Raw(String),
}

impl FilterValue {
    /// Creates a raw sub-query operand.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::Raw(sql.into())
    }

    /// Returns the scalar, if this operand is one.
    #[must_use]
    pub const fn as_value(&self) -> Option<&SqlValue> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! impl_filter_value_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FilterValue {
                fn from(value: $t) -> Self {
                    Self::Value(value.to_sql_value())
                }
            }
        )*
    };
}

impl_filter_value_from!(
    SqlValue,
    bool,
    i64,
    i32,
    i16,
    i8,
    u32,
    u16,
    u8,
    f64,
    f32,
    String,
    &str,
    &String,
    NaiveDate,
    NaiveDateTime
);

impl<T: ToSqlValue> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        Self::Value(value.to_sql_value())
    }
}

impl<T: ToSqlValue> From<Vec<T>> for FilterValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(ToSqlValue::to_sql_value).collect())
    }
}

impl<T: ToSqlValue, const N: usize> From<[T; N]> for FilterValue {
    fn from(values: [T; N]) -> Self {
        Self::List(values.into_iter().map(ToSqlValue::to_sql_value).collect())
    }
}

impl<T: ToSqlValue + Clone> From<&[T]> for FilterValue {
    fn from(values: &[T]) -> Self {
        Self::List(values.iter().cloned().map(ToSqlValue::to_sql_value).collect())
    }
}

impl From<QueryBuilder> for FilterValue {
    fn from(query: QueryBuilder) -> Self {
        Self::Query(Box::new(query))
    }
}

/// How literal values end up in rendered SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindMode {
    /// Values are escaped and written into the SQL text.
    Inline,
    /// Values are replaced by placeholders and collected separately.
    Bound,
}

/// Collects bound parameters while a statement renders.
#[derive(Debug, Clone)]
pub struct Params {
    mode: BindMode,
    values: Vec<SqlValue>,
}

impl Params {
    /// Creates a collector that renders values inline.
    #[must_use]
    pub const fn inline() -> Self {
        Self {
            mode: BindMode::Inline,
            values: Vec::new(),
        }
    }

    /// Creates a collector that renders placeholders.
    #[must_use]
    pub const fn bound() -> Self {
        Self {
            mode: BindMode::Bound,
            values: Vec::new(),
        }
    }

    /// Returns the bind mode.
    #[must_use]
    pub const fn mode(&self) -> BindMode {
        self.mode
    }

    /// Returns the values collected so far.
    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Consumes the collector, returning its values.
    #[must_use]
    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }

    /// Appends a value and returns its 1-based position.
    pub fn push(&mut self, value: SqlValue) -> usize {
        self.values.push(value);
        self.values.len()
    }

    /// Renders a literal inline, or binds it and returns its placeholder.
    pub fn render(&mut self, adapter: &dyn Adapter, value: &SqlValue) -> String {
        match self.mode {
            BindMode::Inline => adapter.quote_value(value),
            BindMode::Bound => {
                let index = self.push(value.clone());
                adapter.placeholder(index)
            }
        }
    }
}
