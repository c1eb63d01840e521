//! Aggregate expressions for the select list.
//!
//! Provides `COUNT`, `SUM`, `AVG`, `MIN` and `MAX`, rendered as
//! `FUNC(expr) [AS alias]`.

use std::fmt;

use crate::adapter::Adapter;

/// An aggregate function name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    /// `COUNT`
    Count,
    /// `SUM`
    Sum,
    /// `AVG`
    Avg,
    /// `MIN`
    Min,
    /// `MAX`
    Max,
}

impl AggregateFunction {
    /// Returns the SQL function name.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// An aggregate over a column or `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    /// Function applied.
    pub function: AggregateFunction,
    /// Column name, `*`, or raw expression text.
    pub expression: String,
    /// Whether to aggregate distinct values only.
    pub distinct: bool,
    /// Output alias.
    pub alias: Option<String>,
}

impl Aggregation {
    /// Creates an aggregate.
    #[must_use]
    pub fn new(function: AggregateFunction, expression: impl Into<String>) -> Self {
        Self {
            function,
            expression: expression.into(),
            distinct: false,
            alias: None,
        }
    }

    /// Creates a `COUNT(expr)` aggregate.
    #[must_use]
    pub fn count(expression: impl Into<String>) -> Self {
        Self::new(AggregateFunction::Count, expression)
    }

    /// Creates a `SUM(expr)` aggregate.
    #[must_use]
    pub fn sum(expression: impl Into<String>) -> Self {
        Self::new(AggregateFunction::Sum, expression)
    }

    /// Creates an `AVG(expr)` aggregate.
    #[must_use]
    pub fn avg(expression: impl Into<String>) -> Self {
        Self::new(AggregateFunction::Avg, expression)
    }

    /// Creates a `MIN(expr)` aggregate.
    #[must_use]
    pub fn min(expression: impl Into<String>) -> Self {
        Self::new(AggregateFunction::Min, expression)
    }

    /// Creates a `MAX(expr)` aggregate.
    #[must_use]
    pub fn max(expression: impl Into<String>) -> Self {
        Self::new(AggregateFunction::Max, expression)
    }

    /// Aggregates distinct values only.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Sets the output alias.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Renders `FUNC([DISTINCT ]expr)` without the alias.
    #[must_use]
    pub fn expression_sql(&self, adapter: &dyn Adapter) -> String {
        let distinct = if self.distinct { "DISTINCT " } else { "" };
        format!(
            "{}({distinct}{})",
            self.function,
            adapter.quote_column_name(self.expression.trim())
        )
    }

    /// Renders `FUNC(expr) [AS alias]`.
    #[must_use]
    pub fn to_sql(&self, adapter: &dyn Adapter) -> String {
        let sql = self.expression_sql(adapter);
        match &self.alias {
            Some(alias) => format!("{sql} AS {}", adapter.quote_column_name(alias)),
            None => sql,
        }
    }
}

/// Creates a `COUNT(expr)` aggregate.
#[must_use]
pub fn count(expression: impl Into<String>) -> Aggregation {
    Aggregation::count(expression)
}

/// Creates a `COUNT(DISTINCT expr)` aggregate.
#[must_use]
pub fn count_distinct(expression: impl Into<String>) -> Aggregation {
    Aggregation::count(expression).distinct()
}

/// Creates a `SUM(expr)` aggregate.
#[must_use]
pub fn sum(expression: impl Into<String>) -> Aggregation {
    Aggregation::sum(expression)
}

/// Creates an `AVG(expr)` aggregate.
#[must_use]
pub fn avg(expression: impl Into<String>) -> Aggregation {
    Aggregation::avg(expression)
}

/// Creates a `MIN(expr)` aggregate.
#[must_use]
pub fn min(expression: impl Into<String>) -> Aggregation {
    Aggregation::min(expression)
}

/// Creates a `MAX(expr)` aggregate.
#[must_use]
pub fn max(expression: impl Into<String>) -> Aggregation {
    Aggregation::max(expression)
}
