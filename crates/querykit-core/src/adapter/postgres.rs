//! PostgreSQL adapter.

use std::sync::Arc;

use super::ddl::{CheckIntegrityOp, ResetSequenceOp};
use super::{Adapter, AdapterOptions, Dialect};
use crate::driver::Driver;
use crate::error::Result;
use crate::lookup::{self, LikeMatch, LookupContext, LookupFn, LookupRegistry};
use crate::schema::{PostgresLoader, TableLoader};
use crate::value::FilterValue;

const COLUMN_TYPES: &[(&str, &str)] = &[
    ("pk", "serial NOT NULL PRIMARY KEY"),
    ("bigpk", "bigserial NOT NULL PRIMARY KEY"),
    ("string", "varchar(255)"),
    ("text", "text"),
    ("smallint", "smallint"),
    ("integer", "integer"),
    ("bigint", "bigint"),
    ("float", "double precision"),
    ("double", "double precision"),
    ("decimal", "numeric(10,0)"),
    ("datetime", "timestamp(0)"),
    ("timestamp", "timestamp(0)"),
    ("time", "time(0)"),
    ("date", "date"),
    ("binary", "bytea"),
    ("boolean", "boolean"),
    ("money", "numeric(19,4)"),
];

/// Adapter for PostgreSQL.
///
/// Identifiers are quoted with double quotes, booleans render as
/// `TRUE`/`FALSE` and bound parameters are numbered (`$1`, `$2`, ...).
#[derive(Debug, Clone)]
pub struct PostgresAdapter {
    options: AdapterOptions,
    driver: Option<Arc<dyn Driver>>,
    lookups: LookupRegistry,
}

impl PostgresAdapter {
    /// Creates an adapter without a driver.
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: AdapterOptions::default(),
            driver: None,
            lookups: Self::default_lookups(),
        }
    }

    /// Replaces the adapter settings.
    #[must_use]
    pub fn with_options(mut self, options: AdapterOptions) -> Self {
        self.options = options;
        self
    }

    /// Attaches a driver for string escaping and the clock.
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

    fn default_lookups() -> LookupRegistry {
        LookupRegistry::with_defaults()
            .register("icontains", icontains)
            .register("istartswith", istartswith)
            .register("iendswith", iendswith)
            .register("regex", regex_match)
            .register("iregex", iregex_match)
    }
}

impl Default for PostgresAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for PostgresAdapter {
    fn dialect(&self) -> Dialect {
        Dialect::PostgreSql
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
        '"'
    }

    fn column_types(&self) -> &'static [(&'static str, &'static str)] {
        COLUMN_TYPES
    }

    fn table_loader(&self) -> Box<dyn TableLoader> {
        Box::new(PostgresLoader::default())
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "TRUE"
        } else {
            "FALSE"
        }
    }

    fn quote_blob(&self, bytes: &[u8]) -> String {
        let hex: String = bytes.iter().map(|byte| format!("{byte:02x}")).collect();
        format!("'\\x{hex}'::bytea")
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn offset_only(&self, offset: u64) -> String {
        format!("LIMIT ALL OFFSET {offset}")
    }

    /// Moves the serial sequence behind `op.column` so `op.value` is the next
    /// value handed out.
    fn reset_sequence(&self, op: &ResetSequenceOp) -> Result<String> {
        let table = self.escape_string(&op.table);
        let column = self.escape_string(&op.column);
        Ok(format!(
            "SELECT SETVAL(pg_get_serial_sequence('{table}', '{column}'), {}, false)",
            op.value
        ))
    }

    /// Toggles trigger-based constraint enforcement for one table, or for the
    /// whole session when no table is given.
    fn check_integrity(&self, op: &CheckIntegrityOp) -> Result<String> {
        match &op.table {
            Some(table) => {
                let table = match &op.schema {
                    Some(schema) => format!("{schema}.{table}"),
                    None => table.clone(),
                };
                let action = if op.enable { "ENABLE" } else { "DISABLE" };
                Ok(format!(
                    "ALTER TABLE {} {action} TRIGGER ALL",
                    self.quote_table_name(&table)
                ))
            }
            None => {
                let role = if op.enable { "origin" } else { "replica" };
                Ok(format!("SET session_replication_role = '{role}'"))
            }
        }
    }
}

fn icontains(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    lookup::like(ctx, "icontains", field, "ILIKE", value, LikeMatch::Contains, false)
}

fn istartswith(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    lookup::like(ctx, "istartswith", field, "ILIKE", value, LikeMatch::StartsWith, false)
}

fn iendswith(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    lookup::like(ctx, "iendswith", field, "ILIKE", value, LikeMatch::EndsWith, false)
}

fn regex_match(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    lookup::pattern(ctx, "regex", field, "~", value)
}

fn iregex_match(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    lookup::pattern(ctx, "iregex", field, "~*", value)
}
