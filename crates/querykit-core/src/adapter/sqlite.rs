//! SQLite adapter.

use std::sync::Arc;

use super::ddl::{
    AddForeignKeyOp, AddPrimaryKeyOp, AlterColumnOp, CheckIntegrityOp, DropForeignKeyOp,
    DropPrimaryKeyOp, DropTableOp, ResetSequenceOp, TruncateTableOp,
};
use super::{Adapter, AdapterOptions, Dialect};
use crate::driver::Driver;
use crate::error::{QueryError, Result};
use crate::lookup::{DatePart, LookupContext, LookupFn, LookupRegistry};
use crate::schema::{SqliteLoader, TableLoader};
use crate::value::{FilterValue, SqlValue};

const COLUMN_TYPES: &[(&str, &str)] = &[
    ("pk", "integer PRIMARY KEY AUTOINCREMENT NOT NULL"),
    ("bigpk", "integer PRIMARY KEY AUTOINCREMENT NOT NULL"),
    ("string", "varchar(255)"),
    ("text", "text"),
    ("smallint", "smallint"),
    ("integer", "integer"),
    ("bigint", "bigint"),
    ("float", "float"),
    ("double", "double"),
    ("decimal", "decimal(10,0)"),
    ("datetime", "datetime"),
    ("timestamp", "timestamp"),
    ("time", "time"),
    ("date", "date"),
    ("binary", "blob"),
    ("boolean", "boolean"),
    ("money", "decimal(19,4)"),
];

/// Adapter for SQLite 3.
///
/// Identifiers are quoted with backticks. SQLite's `LIKE` ignores ASCII case,
/// so `contains` and `icontains` match the same rows for ASCII text. `REGEXP`
/// needs a user function registered on the connection.
#[derive(Debug, Clone)]
pub struct SqliteAdapter {
    options: AdapterOptions,
    driver: Option<Arc<dyn Driver>>,
    lookups: LookupRegistry,
}

impl SqliteAdapter {
    /// Creates an adapter without a driver.
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: AdapterOptions::default(),
            driver: None,
            lookups: LookupRegistry::with_defaults().register("iregex", iregex_match),
        }
    }

    /// Replaces the adapter settings.
    #[must_use]
    pub fn with_options(mut self, options: AdapterOptions) -> Self {
        self.options = options;
        self
    }

    /// Attaches a driver for the clock and schema reflection.
    #[must_use]
    pub fn with_driver(mut self, driver: Arc<dyn Driver>) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Adds or replaces a lookup.
    #[must_use]
    pub fn with_lookup(mut self, name: impl Into<String>, lookup: LookupFn) -> Self {
        self.lookups = self.lookups.register(name, lookup);
        self
    }

    fn unsupported(&self, feature: &str) -> QueryError {
        QueryError::not_supported(self.name(), feature)
    }
}

impl Default for SqliteAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for SqliteAdapter {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn options(&self) -> &AdapterOptions {
        &self.options
    }

    fn driver(&self) -> Option<&Arc<dyn Driver>> {
        self.driver.as_ref()
    }

    fn lookups(&self) -> &LookupRegistry {
        &self.lookups
    }

    fn quote_char(&self) -> char {
        '`'
    }

    fn column_types(&self) -> &'static [(&'static str, &'static str)] {
        COLUMN_TYPES
    }

    fn table_loader(&self) -> Box<dyn TableLoader> {
        Box::new(SqliteLoader)
    }

    // Compound SELECT operands cannot be parenthesized in SQLite, and only
    // the last one may carry ORDER BY or LIMIT.
    fn union_operand(&self, sql: &str, compound: bool) -> String {
        if compound {
            format!("SELECT * FROM ({sql})")
        } else {
            sql.to_string()
        }
    }

    fn like_escape(&self) -> &'static str {
        " ESCAPE '\\'"
    }

    fn date_part(&self, part: DatePart, field: &str) -> String {
        let format = match part {
            DatePart::Year => "%Y",
            DatePart::Month => "%m",
            DatePart::Day => "%d",
            DatePart::WeekDay => return format!("CAST(strftime('%w', {field}) AS INTEGER)+1"),
            DatePart::Hour => "%H",
            DatePart::Minute => "%M",
            DatePart::Second => "%S",
        };
        format!("CAST(strftime('{format}', {field}) AS INTEGER)")
    }

    fn drop_table(&self, op: &DropTableOp) -> Result<String> {
        if op.cascade {
            return Err(self.unsupported("DROP TABLE ... CASCADE"));
        }
        let if_exists = if op.if_exists { " IF EXISTS" } else { "" };
        Ok(format!(
            "DROP TABLE{if_exists} {}",
            self.quote_table_name(&op.name)
        ))
    }

    fn truncate_table(&self, op: &TruncateTableOp) -> Result<String> {
        Ok(format!("DELETE FROM {}", self.quote_table_name(&op.name)))
    }

    fn alter_column(&self, _op: &AlterColumnOp) -> Result<String> {
        Err(self.unsupported("altering columns"))
    }

    fn add_primary_key(&self, _op: &AddPrimaryKeyOp) -> Result<String> {
        Err(self.unsupported("adding a primary key to an existing table"))
    }

    fn drop_primary_key(&self, _op: &DropPrimaryKeyOp) -> Result<String> {
        Err(self.unsupported("dropping a primary key"))
    }

    fn add_foreign_key(&self, _op: &AddForeignKeyOp) -> Result<String> {
        Err(self.unsupported("adding a foreign key to an existing table"))
    }

    fn drop_foreign_key(&self, _op: &DropForeignKeyOp) -> Result<String> {
        Err(self.unsupported("dropping a foreign key"))
    }

    fn reset_sequence(&self, op: &ResetSequenceOp) -> Result<String> {
        let table = self.raw_table_name(&op.table);
        Ok(format!(
            "UPDATE sqlite_sequence SET seq={} WHERE name={}",
            op.value.saturating_sub(1),
            self.quote_string(&table)
        ))
    }

    fn check_integrity(&self, op: &CheckIntegrityOp) -> Result<String> {
        let state = if op.enable { "ON" } else { "OFF" };
        Ok(format!("PRAGMA foreign_keys = {state}"))
    }
}

fn iregex_match(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    let text = value
        .as_value()
        .and_then(SqlValue::to_plain_string)
        .ok_or_else(|| QueryError::invalid_value("iregex", "expected a pattern"))?;
    let rhs = ctx.value(&SqlValue::Text(format!("(?i){text}")));
    Ok(format!("{field} REGEXP {rhs}"))
}
