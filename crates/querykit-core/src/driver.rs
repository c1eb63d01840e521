//! Database driver abstraction.
//!
//! The query builder never talks to a database itself. A [`Driver`] is only
//! needed for string escaping done by the connection, the server clock, a few
//! DDL statements that inspect the live table, and schema reflection.

use std::fmt;

use chrono::NaiveDateTime;

use crate::error::Result;
use crate::value::SqlValue;

/// A database connection handle.
pub trait Driver: fmt::Debug + Send + Sync {
    /// Returns the driver name, e.g. `sqlite` or `pgsql`.
    fn name(&self) -> &str;

    /// Executes a statement and returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// Returns [`crate::QueryError::Driver`] on database errors.
    fn execute(&self, sql: &str) -> Result<u64>;

    /// Runs a query and returns every row.
    ///
    /// # Errors
    ///
    /// Returns [`crate::QueryError::Driver`] on database errors.
    fn query_all(&self, sql: &str) -> Result<Vec<Row>>;

    /// Runs a query and returns the first row.
    ///
    /// # Errors
    ///
    /// Returns [`crate::QueryError::Driver`] on database errors.
    fn query_one(&self, sql: &str) -> Result<Option<Row>> {
        Ok(self.query_all(sql)?.into_iter().next())
    }

    /// Runs a query and returns the first column of the first row.
    ///
    /// # Errors
    ///
    /// Returns [`crate::QueryError::Driver`] on database errors.
    fn query_scalar(&self, sql: &str) -> Result<Option<SqlValue>> {
        Ok(self
            .query_one(sql)?
            .and_then(|row| row.values.into_iter().next()))
    }

    /// Quotes a string literal using the connection's own escaping, if it
    /// has any.
    fn quote_string(&self, _value: &str) -> Option<String> {
        None
    }

    /// Returns the database server's current time, if it can report it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::QueryError::Driver`] on database errors.
    fn now(&self) -> Result<Option<NaiveDateTime>> {
        Ok(None)
    }
}

/// A result row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<SqlValue>,
}

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.push(column, value);
        self
    }

    /// Appends a column.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<SqlValue>) {
        self.columns.push(column.into());
        self.values.push(value.into());
    }

    /// Returns the column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the values in column order.
    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Returns a value by column name, ignoring ASCII case.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .position(|name| name.eq_ignore_ascii_case(column))
            .and_then(|index| self.values.get(index))
    }

    /// Returns a text value by column name.
    #[must_use]
    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(SqlValue::as_str)
    }

    /// Returns a text value by position.
    #[must_use]
    pub fn get_str_at(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(SqlValue::as_str)
    }

    /// Returns an integer value by column name.
    #[must_use]
    pub fn get_i64(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(SqlValue::as_i64)
    }

    /// Returns a boolean value by column name. Integers and the usual text
    /// spellings (`YES`, `t`, `true`, ...) are accepted.
    #[must_use]
    pub fn get_bool(&self, column: &str) -> Option<bool> {
        self.get(column).and_then(SqlValue::as_bool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_accessors() {
        let row = Row::new()
            .with("Field", "id")
            .with("notnull", 1_i64)
            .with("dflt_value", None::<String>)
            .with("Null", "YES");
        assert_eq!(row.get_str("field"), Some("id"));
        assert_eq!(row.get_i64("NOTNULL"), Some(1));
        assert_eq!(row.get_bool("null"), Some(true));
        assert_eq!(row.get("dflt_value"), Some(&SqlValue::Null));
        assert_eq!(row.get_str_at(0), Some("id"));
        assert!(row.get("missing").is_none());
    }
}
