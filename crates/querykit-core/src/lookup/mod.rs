//! Lookup registry and built-in lookups.
//!
//! A lookup turns a quoted field and a [`FilterValue`] into a predicate
//! fragment. Every adapter owns one [`LookupRegistry`], built once when the
//! adapter is constructed; dialects override individual entries where their
//! SQL differs.

mod builder;

use std::collections::HashMap;
use std::fmt;

pub use builder::LookupBuilder;

use crate::adapter::Adapter;
use crate::builder::QueryBuilder;
use crate::error::{QueryError, Result};
use crate::value::{FilterValue, Params, SqlValue};

/// Operator used when a leaf has no `__operator` suffix.
pub const DEFAULT_LOOKUP: &str = "exact";

/// Signature of a lookup: `(context, quoted_field, value) -> fragment`.
pub type LookupFn = fn(&mut LookupContext<'_>, &str, &FilterValue) -> Result<String>;

/// Operator table of one adapter.
#[derive(Clone, Default)]
pub struct LookupRegistry {
    lookups: HashMap<String, LookupFn>,
}

impl fmt::Debug for LookupRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

impl LookupRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the dialect-neutral lookups.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new()
            .register("exact", exact)
            .register("gt", gt)
            .register("gte", gte)
            .register("lt", lt)
            .register("lte", lte)
            .register("in", in_list)
            .register("isnull", isnull)
            .register("range", range)
            .register("contains", contains)
            .register("icontains", icontains)
            .register("startswith", startswith)
            .register("istartswith", istartswith)
            .register("endswith", endswith)
            .register("iendswith", iendswith)
            .register("regex", regex_match)
            .register("iregex", regex_match)
            .register("year", year)
            .register("month", month)
            .register("day", day)
            .register("week_day", week_day)
            .register("hour", hour)
            .register("minute", minute)
            .register("second", second)
    }

    /// Adds or replaces a lookup.
    #[must_use]
    pub fn register(mut self, name: impl Into<String>, lookup: LookupFn) -> Self {
        self.lookups.insert(name.into(), lookup);
        self
    }

    /// Returns the lookup registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<LookupFn> {
        self.lookups.get(name).copied()
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.lookups.contains_key(name)
    }

    /// Returns the registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.lookups.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// State available to a lookup while it renders.
///
/// Values go through [`LookupContext::value`] so they are either escaped
/// inline or bound as parameters, depending on how the statement is built.
pub struct LookupContext<'a> {
    adapter: &'a dyn Adapter,
    params: &'a mut Params,
}

impl<'a> LookupContext<'a> {
    pub(crate) fn new(adapter: &'a dyn Adapter, params: &'a mut Params) -> Self {
        Self { adapter, params }
    }

    /// Returns the adapter the statement renders for.
    #[must_use]
    pub fn adapter(&self) -> &dyn Adapter {
        self.adapter
    }

    /// Renders a literal, or binds it and returns its placeholder.
    pub fn value(&mut self, value: &SqlValue) -> String {
        self.params.render(self.adapter, value)
    }

    /// Renders literals separated by `, `.
    pub fn list(&mut self, values: &[SqlValue]) -> String {
        values
            .iter()
            .map(|v| self.value(v))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Renders a sub-query in parentheses.
    ///
    /// # Errors
    ///
    /// Propagates any error from compiling the sub-query.
    pub fn subquery(&mut self, query: &QueryBuilder) -> Result<String> {
        let sql = query.compile(self.adapter, self.params)?;
        Ok(format!("({sql})"))
    }

    /// Renders any operand: scalars as literals, lists and sub-queries in
    /// parentheses.
    ///
    /// # Errors
    ///
    /// Propagates any error from compiling a sub-query.
    pub fn operand(&mut self, value: &FilterValue) -> Result<String> {
        match value {
            FilterValue::Value(v) => Ok(self.value(v)),
            FilterValue::List(items) => Ok(format!("({})", self.list(items))),
            FilterValue::Query(query) => self.subquery(query),
            FilterValue::Raw(sql) => Ok(format!("({})", self.adapter.quote_sql(sql))),
        }
    }
}

/// Date component extracted by the date-part lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    /// Calendar year.
    Year,
    /// Month, 1-12.
    Month,
    /// Day of month.
    Day,
    /// Day of week, 1 (Sunday) to 7 (Saturday).
    WeekDay,
    /// Hour, 0-23.
    Hour,
    /// Minute.
    Minute,
    /// Second.
    Second,
}

impl DatePart {
    /// Returns the lookup name.
    #[must_use]
    pub const fn lookup_name(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
            Self::WeekDay => "week_day",
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Second => "second",
        }
    }
}

/// Where the wildcards go in a LIKE pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeMatch {
    /// `%text%`
    Contains,
    /// `text%`
    StartsWith,
    /// `%text`
    EndsWith,
}

impl LikeMatch {
    /// Wraps already-escaped text in wildcards.
    #[must_use]
    pub fn pattern(self, escaped: &str) -> String {
        match self {
            Self::Contains => format!("%{escaped}%"),
            Self::StartsWith => format!("{escaped}%"),
            Self::EndsWith => format!("%{escaped}"),
        }
    }
}

/// Escapes LIKE wildcards so user text matches literally.
#[must_use]
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Renders `lhs operator 'pattern'` for the LIKE family.
///
/// With `lowercase` the pattern text is lowercased, for use with a
/// `LOWER(field)` left-hand side.
///
/// # Errors
///
/// Returns [`QueryError::InvalidLookupValue`] unless the value is a
/// non-null scalar.
pub fn like(
    ctx: &mut LookupContext<'_>,
    lookup: &str,
    lhs: &str,
    operator: &str,
    value: &FilterValue,
    kind: LikeMatch,
    lowercase: bool,
) -> Result<String> {
    let text = value
        .as_value()
        .and_then(SqlValue::to_plain_string)
        .ok_or_else(|| QueryError::invalid_value(lookup, "expected a text value"))?;
    let text = if lowercase { text.to_lowercase() } else { text };
    let pattern = SqlValue::Text(kind.pattern(&escape_like(&text)));
    let rhs = ctx.value(&pattern);
    Ok(format!("{lhs} {operator} {rhs}{}", ctx.adapter().like_escape()))
}

/// Renders `lhs operator value` for a single pattern operand.
///
/// # Errors
///
/// Returns [`QueryError::InvalidLookupValue`] unless the value is a
/// non-null scalar.
pub fn pattern(
    ctx: &mut LookupContext<'_>,
    lookup: &str,
    lhs: &str,
    operator: &str,
    value: &FilterValue,
) -> Result<String> {
    let text = value
        .as_value()
        .and_then(SqlValue::to_plain_string)
        .ok_or_else(|| QueryError::invalid_value(lookup, "expected a pattern"))?;
    let rhs = ctx.value(&SqlValue::Text(text));
    Ok(format!("{lhs} {operator} {rhs}"))
}

fn comparison(
    ctx: &mut LookupContext<'_>,
    lookup: &str,
    operator: &str,
    field: &str,
    value: &FilterValue,
) -> Result<String> {
    match value {
        FilterValue::Value(SqlValue::Null) | FilterValue::List(_) => Err(
            QueryError::invalid_value(lookup, "expected a non-null scalar or a sub-query"),
        ),
        operand => Ok(format!("{field}{operator}{}", ctx.operand(operand)?)),
    }
}

fn exact(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    match value {
        FilterValue::Value(SqlValue::Null) => Ok(format!("{field} IS NULL")),
        FilterValue::List(_) => Err(QueryError::invalid_value(
            "exact",
            "expected a scalar or a sub-query, got a list",
        )),
        operand => Ok(format!("{field}={}", ctx.operand(operand)?)),
    }
}

fn gt(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    comparison(ctx, "gt", ">", field, value)
}

fn gte(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    comparison(ctx, "gte", ">=", field, value)
}

fn lt(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    comparison(ctx, "lt", "<", field, value)
}

fn lte(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    comparison(ctx, "lte", "<=", field, value)
}

fn in_list(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    match value {
        // Nothing can be IN an empty set.
        FilterValue::List(items) if items.is_empty() => Ok(String::from("0=1")),
        FilterValue::Value(v) => Ok(format!("{field} IN ({})", ctx.value(v))),
        operand => Ok(format!("{field} IN {}", ctx.operand(operand)?)),
    }
}

fn isnull(_ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    let is_null = value
        .as_value()
        .and_then(SqlValue::as_bool)
        .ok_or_else(|| QueryError::invalid_value("isnull", "expected a boolean"))?;
    if is_null {
        Ok(format!("{field} IS NULL"))
    } else {
        Ok(format!("{field} IS NOT NULL"))
    }
}

fn range(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    if let FilterValue::List(items) = value {
        if let [low, high] = items.as_slice() {
            let low = ctx.value(low);
            let high = ctx.value(high);
            return Ok(format!("{field} BETWEEN {low} AND {high}"));
        }
    }
    Err(QueryError::invalid_value(
        "range",
        "expected a list of two values",
    ))
}

fn contains(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    like(ctx, "contains", field, "LIKE", value, LikeMatch::Contains, false)
}

fn icontains(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    let lhs = format!("LOWER({field})");
    like(ctx, "icontains", &lhs, "LIKE", value, LikeMatch::Contains, true)
}

fn startswith(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    like(ctx, "startswith", field, "LIKE", value, LikeMatch::StartsWith, false)
}

fn istartswith(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    let lhs = format!("LOWER({field})");
    like(ctx, "istartswith", &lhs, "LIKE", value, LikeMatch::StartsWith, true)
}

fn endswith(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    like(ctx, "endswith", field, "LIKE", value, LikeMatch::EndsWith, false)
}

fn iendswith(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    let lhs = format!("LOWER({field})");
    like(ctx, "iendswith", &lhs, "LIKE", value, LikeMatch::EndsWith, true)
}

fn regex_match(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    pattern(ctx, "regex", field, "REGEXP", value)
}

fn date_part(
    ctx: &mut LookupContext<'_>,
    part: DatePart,
    field: &str,
    value: &FilterValue,
) -> Result<String> {
    let expr = ctx.adapter().date_part(part, field);
    comparison(ctx, part.lookup_name(), "=", &expr, value)
}

fn year(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    date_part(ctx, DatePart::Year, field, value)
}

fn month(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    date_part(ctx, DatePart::Month, field, value)
}

fn day(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    date_part(ctx, DatePart::Day, field, value)
}

fn week_day(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    date_part(ctx, DatePart::WeekDay, field, value)
}

fn hour(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    date_part(ctx, DatePart::Hour, field, value)
}

fn minute(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    date_part(ctx, DatePart::Minute, field, value)
}

fn second(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    date_part(ctx, DatePart::Second, field, value)
}
