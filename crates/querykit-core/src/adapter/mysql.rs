//! MySQL adapter.

use std::sync::Arc;

use tracing::debug;

use super::ddl::{
    AlterColumnOp, CheckIntegrityOp, DropForeignKeyOp, DropIndexOp, DropPrimaryKeyOp,
    RenameColumnOp, RenameTableOp, ResetSequenceOp,
};
use super::{Adapter, AdapterOptions, Dialect};
use crate::driver::Driver;
use crate::error::Result;
use crate::lookup::{self, DatePart, LikeMatch, LookupContext, LookupFn, LookupRegistry};
use crate::schema::{MysqlLoader, TableLoader};
use crate::value::FilterValue;

const COLUMN_TYPES: &[(&str, &str)] = &[
    ("pk", "int(11) NOT NULL AUTO_INCREMENT PRIMARY KEY"),
    ("bigpk", "bigint(20) NOT NULL AUTO_INCREMENT PRIMARY KEY"),
    ("string", "varchar(255)"),
    ("text", "text"),
    ("smallint", "smallint(6)"),
    ("integer", "int(11)"),
    ("bigint", "bigint(20)"),
    ("float", "float"),
    ("double", "double"),
    ("decimal", "decimal(10,0)"),
    ("datetime", "datetime"),
    ("timestamp", "timestamp"),
    ("time", "time"),
    ("date", "date"),
    ("binary", "blob"),
    ("boolean", "tinyint(1)"),
    ("money", "decimal(19,4)"),
];

/// Adapter for MySQL and MariaDB.
///
/// Identifiers are quoted with backticks. LIKE lookups compare with
/// `LIKE BINARY` so the case-sensitive variants stay case-sensitive under
/// the default collations.
#[derive(Debug, Clone)]
pub struct MysqlAdapter {
    options: AdapterOptions,
    driver: Option<Arc<dyn Driver>>,
    lookups: LookupRegistry,
}

impl MysqlAdapter {
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

    /// Attaches a driver for string escaping, clock and table inspection.
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
            .register("contains", contains)
            .register("startswith", startswith)
            .register("endswith", endswith)
            .register("regex", regex_match)
            .register("iregex", iregex_match)
    }
}

impl Default for MysqlAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for MysqlAdapter {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
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
        Box::new(MysqlLoader)
    }

    fn escape_string(&self, value: &str) -> String {
        value.replace('\\', "\\\\").replace('\'', "''")
    }

    fn offset_only(&self, offset: u64) -> String {
        format!("LIMIT {offset}, {}", u64::MAX)
    }

    fn random_order(&self) -> &'static str {
        "RAND()"
    }

    fn date_part(&self, part: DatePart, field: &str) -> String {
        match part {
            DatePart::Year => format!("YEAR({field})"),
            DatePart::Month => format!("MONTH({field})"),
            DatePart::Day => format!("DAYOFMONTH({field})"),
            DatePart::WeekDay => format!("DAYOFWEEK({field})"),
            DatePart::Hour => format!("HOUR({field})"),
            DatePart::Minute => format!("MINUTE({field})"),
            DatePart::Second => format!("SECOND({field})"),
        }
    }

    fn rename_table(&self, op: &RenameTableOp) -> Result<String> {
        Ok(format!(
            "RENAME TABLE {} TO {}",
            self.quote_table_name(&op.old_name),
            self.quote_table_name(&op.new_name)
        ))
    }

    /// Without a driver this renders `RENAME COLUMN` (MySQL 8). With one,
    /// the current column definition is read from `SHOW CREATE TABLE` and
    /// carried over through `CHANGE`.
    fn rename_column(&self, op: &RenameColumnOp) -> Result<String> {
        let table = self.quote_table_name(&op.table);
        let old_name = self.quote_column_name(&op.old_name);
        let new_name = self.quote_column_name(&op.new_name);
        if let Some(driver) = &self.driver {
            let row = driver.query_one(&format!("SHOW CREATE TABLE {table}"))?;
            let create_sql = row
                .as_ref()
                .and_then(|row| row.get_str("Create Table").or_else(|| row.get_str_at(1)));
            if let Some(create_sql) = create_sql {
                let definition = create_sql.lines().map(str::trim).find_map(|line| {
                    line.strip_prefix(old_name.as_str())
                        .map(|rest| rest.trim().trim_end_matches(',').to_string())
                });
                if let Some(definition) = definition {
                    return Ok(format!(
                        "ALTER TABLE {table} CHANGE {old_name} {new_name} {definition}"
                    ));
                }
            }
            debug!(table = %op.table, column = %op.old_name, "Column definition not found");
        }
        Ok(format!(
            "ALTER TABLE {table} RENAME COLUMN {old_name} TO {new_name}"
        ))
    }

    fn alter_column(&self, op: &AlterColumnOp) -> Result<String> {
        let column = self.quote_column_name(&op.column);
        Ok(format!(
            "ALTER TABLE {} CHANGE {column} {column} {}",
            self.quote_table_name(&op.table),
            self.column_type(&op.definition)
        ))
    }

    fn drop_primary_key(&self, op: &DropPrimaryKeyOp) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} DROP PRIMARY KEY",
            self.quote_table_name(&op.table)
        ))
    }

    fn drop_foreign_key(&self, op: &DropForeignKeyOp) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} DROP FOREIGN KEY {}",
            self.quote_table_name(&op.table),
            self.quote_column_name(&op.name)
        ))
    }

    fn drop_index(&self, op: &DropIndexOp) -> Result<String> {
        Ok(format!(
            "DROP INDEX {} ON {}",
            self.quote_table_name(&op.name),
            self.quote_table_name(&op.table)
        ))
    }

    fn reset_sequence(&self, op: &ResetSequenceOp) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} AUTO_INCREMENT={}",
            self.quote_table_name(&op.table),
            op.value
        ))
    }

    fn check_integrity(&self, op: &CheckIntegrityOp) -> Result<String> {
        Ok(format!(
            "SET FOREIGN_KEY_CHECKS = {}",
            u8::from(op.enable)
        ))
    }
}

fn contains(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    lookup::like(ctx, "contains", field, "LIKE BINARY", value, LikeMatch::Contains, false)
}

fn startswith(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    lookup::like(ctx, "startswith", field, "LIKE BINARY", value, LikeMatch::StartsWith, false)
}

fn endswith(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    lookup::like(ctx, "endswith", field, "LIKE BINARY", value, LikeMatch::EndsWith, false)
}

fn regex_match(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    lookup::pattern(ctx, "regex", field, "REGEXP BINARY", value)
}

fn iregex_match(ctx: &mut LookupContext<'_>, field: &str, value: &FilterValue) -> Result<String> {
    lookup::pattern(ctx, "iregex", field, "REGEXP", value)
}
