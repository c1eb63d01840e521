//! Dialect adapters.
//!
//! An [`Adapter`] owns everything that differs between SQL grammars:
//! identifier and literal quoting, LIMIT/OFFSET syntax, DDL templates and the
//! lookup registry. The provided methods render ANSI-flavoured SQL; each
//! dialect overrides what its grammar does differently.

pub mod ddl;
mod mysql;
mod postgres;
mod sqlite;

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use chrono::{NaiveDateTime, Utc};
use regex::{Captures, NoExpand, Regex};
use serde::{Deserialize, Serialize};

pub use ddl::{
    AddColumnOp, AddForeignKeyOp, AddPrimaryKeyOp, AlterColumnOp, CheckIntegrityOp,
    CreateIndexOp, CreateTableOp, DdlOperation, DropColumnOp, DropForeignKeyOp, DropIndexOp,
    DropPrimaryKeyOp, DropTableOp, ForeignKeyAction, RenameColumnOp, RenameTableOp,
    ResetSequenceOp, TableBody, TableElement, TruncateTableOp,
};
pub use mysql::MysqlAdapter;
pub use postgres::PostgresAdapter;
pub use sqlite::SqliteAdapter;

use crate::date::{DateInput, DATE_FORMAT, DATE_TIME_FORMAT};
use crate::driver::Driver;
use crate::error::{QueryError, Result};
use crate::lookup::{DatePart, LookupRegistry};
use crate::schema::TableLoader;
use crate::value::SqlValue;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{(%?[\w\-. ]+%?)\}\}|\[\[([\w\-. ]+)\]\]").expect("valid placeholder regex")
});

static COLUMN_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\w+)(?:\(([^)]*)\))?(.*)$").expect("valid column type regex")
});

static TYPE_SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("valid type size regex"));

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    /// MySQL and MariaDB.
    #[serde(rename = "mysql")]
    MySql,
    /// PostgreSQL.
    #[serde(rename = "pgsql", alias = "postgres", alias = "postgresql")]
    PostgreSql,
    /// SQLite 3.
    #[serde(rename = "sqlite", alias = "sqlite3")]
    Sqlite,
}

impl Dialect {
    /// Returns the canonical driver name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::PostgreSql => "pgsql",
            Self::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Self::MySql),
            "pgsql" | "postgres" | "postgresql" => Ok(Self::PostgreSql),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            other => Err(QueryError::UnknownSource(other.to_string())),
        }
    }
}

/// Adapter settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterOptions {
    /// Substituted for `%` in `{{%table}}` placeholders.
    pub table_prefix: String,
}

/// A SQL dialect: quoting, literal formats and statement templates.
pub trait Adapter: fmt::Debug + Send + Sync {
    /// Returns the dialect.
    fn dialect(&self) -> Dialect;

    /// Returns the adapter settings.
    fn options(&self) -> &AdapterOptions;

    /// Returns the attached driver handle, if any.
    fn driver(&self) -> Option<&Arc<dyn Driver>>;

    /// Returns the dialect's lookup registry.
    fn lookups(&self) -> &LookupRegistry;

    /// Returns the identifier quote character.
    fn quote_char(&self) -> char;

    /// Returns the abstract column type map.
    fn column_types(&self) -> &'static [(&'static str, &'static str)];

    /// Returns the schema loader for this dialect.
    fn table_loader(&self) -> Box<dyn TableLoader>;

    /// Returns the driver name of this adapter.
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    // Quoting

    /// Quotes a table name without schema prefix. Already quoted names are
    /// returned as is.
    ///
    /// Identifiers are trusted input: any name containing the quote
    /// character counts as quoted and is not escaped. Never pass
    /// user-supplied text as a table or column name.
    fn quote_simple_table_name(&self, name: &str) -> String {
        let q = self.quote_char();
        if name.contains(q) {
            name.to_string()
        } else {
            format!("{q}{name}{q}")
        }
    }

    /// Quotes a column name without table prefix. `*` is left alone.
    ///
    /// Same trust rule as [`Adapter::quote_simple_table_name`].
    fn quote_simple_column_name(&self, name: &str) -> String {
        let q = self.quote_char();
        if name == "*" || name.contains(q) {
            name.to_string()
        } else {
            format!("{q}{name}{q}")
        }
    }

    /// Quotes a possibly schema-qualified table name.
    ///
    /// Names containing `(` or `{{` are treated as raw SQL.
    fn quote_table_name(&self, name: &str) -> String {
        if name.contains('(') || name.contains("{{") {
            return self.quote_sql(name);
        }
        name.split('.')
            .map(|part| self.quote_simple_table_name(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Quotes a possibly alias-qualified column name.
    ///
    /// Names containing `(`, `[[` or `{{` are treated as raw SQL.
    fn quote_column_name(&self, name: &str) -> String {
        if name.contains('(') || name.contains("[[") || name.contains("{{") {
            return self.quote_sql(name);
        }
        match name.rsplit_once('.') {
            Some((prefix, column)) => format!(
                "{}.{}",
                self.quote_table_name(prefix),
                self.quote_simple_column_name(column)
            ),
            None => self.quote_simple_column_name(name),
        }
    }

    /// Expands `[[column]]` and `{{table}}` / `{{%table}}` placeholders.
    fn quote_sql(&self, sql: &str) -> String {
        PLACEHOLDER_RE
            .replace_all(sql, |caps: &Captures<'_>| {
                if let Some(table) = caps.get(1) {
                    let name = table.as_str().replace('%', &self.options().table_prefix);
                    self.quote_table_name(&name)
                } else if let Some(column) = caps.get(2) {
                    self.quote_column_name(column.as_str())
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned()
    }

    /// Strips `{{ }}` from a table placeholder and applies the prefix.
    fn raw_table_name(&self, name: &str) -> String {
        match name
            .strip_prefix("{{")
            .and_then(|rest| rest.strip_suffix("}}"))
        {
            Some(inner) => inner.replace('%', &self.options().table_prefix),
            None => name.to_string(),
        }
    }

    /// Escapes text for use inside a string literal.
    fn escape_string(&self, value: &str) -> String {
        value.replace('\'', "''")
    }

    /// Quotes a string literal, delegating to the driver when it escapes.
    fn quote_string(&self, value: &str) -> String {
        if let Some(quoted) = self.driver().and_then(|driver| driver.quote_string(value)) {
            return quoted;
        }
        format!("'{}'", self.escape_string(value))
    }

    /// Returns the literal for a boolean.
    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    /// Renders a binary literal.
    fn quote_blob(&self, bytes: &[u8]) -> String {
        let hex: String = bytes.iter().map(|byte| format!("{byte:02X}")).collect();
        format!("X'{hex}'")
    }

    /// Renders a value as a SQL literal. NaN and infinities have no literal
    /// form and render as `NULL`.
    fn quote_value(&self, value: &SqlValue) -> String {
        match value {
            SqlValue::Null => String::from("NULL"),
            SqlValue::Bool(b) => self.boolean_literal(*b).to_string(),
            SqlValue::Int(n) => n.to_string(),
            SqlValue::Float(f) if !f.is_finite() => String::from("NULL"),
            SqlValue::Float(f) => f.to_string(),
            SqlValue::Text(s) => self.quote_string(s),
            SqlValue::Blob(bytes) => self.quote_blob(bytes),
            SqlValue::Date(date) => self.quote_string(&date.format(DATE_FORMAT).to_string()),
            SqlValue::DateTime(dt) => self.quote_string(&dt.format(DATE_TIME_FORMAT).to_string()),
        }
    }

    /// Returns the placeholder for the 1-based parameter `index`.
    fn placeholder(&self, _index: usize) -> String {
        String::from("?")
    }

    // Dates

    /// Returns the current time, from the driver clock when available.
    ///
    /// # Errors
    ///
    /// Propagates driver errors.
    fn now(&self) -> Result<NaiveDateTime> {
        if let Some(driver) = self.driver() {
            if let Some(now) = driver.now()? {
                return Ok(now);
            }
        }
        Ok(Utc::now().naive_utc())
    }

    /// Formats the input as a `YYYY-MM-DD` date string.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidDate`] for unparseable input.
    fn convert_to_date(&self, input: DateInput) -> Result<String> {
        let dt = input.resolve(|| self.now())?;
        Ok(dt.format(DATE_FORMAT).to_string())
    }

    /// Formats the input as a `YYYY-MM-DD HH:MM:SS` string.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidDate`] for unparseable input.
    fn convert_to_date_time(&self, input: DateInput) -> Result<String> {
        let dt = input.resolve(|| self.now())?;
        Ok(dt.format(DATE_TIME_FORMAT).to_string())
    }

    /// Extracts a date component from `field` as an integer expression.
    fn date_part(&self, part: DatePart, field: &str) -> String {
        match part {
            DatePart::Year => format!("EXTRACT(YEAR FROM {field})"),
            DatePart::Month => format!("EXTRACT(MONTH FROM {field})"),
            DatePart::Day => format!("EXTRACT(DAY FROM {field})"),
            DatePart::WeekDay => format!("EXTRACT(DOW FROM {field})+1"),
            DatePart::Hour => format!("EXTRACT(HOUR FROM {field})"),
            DatePart::Minute => format!("EXTRACT(MINUTE FROM {field})"),
            DatePart::Second => format!("EXTRACT(SECOND FROM {field})"),
        }
    }

    // Clauses

    /// Renders LIMIT/OFFSET. Zero counts as unset; nothing is rendered when
    /// both are unset.
    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        match (limit.filter(|l| *l > 0), offset.filter(|o| *o > 0)) {
            (None, None) => String::new(),
            (Some(limit), None) => format!("LIMIT {limit}"),
            (Some(limit), Some(offset)) => format!("LIMIT {limit} OFFSET {offset}"),
            (None, Some(offset)) => self.offset_only(offset),
        }
    }

    /// Renders an OFFSET without a LIMIT.
    fn offset_only(&self, offset: u64) -> String {
        format!("LIMIT {} OFFSET {offset}", i64::MAX)
    }

    /// Returns the random ordering expression.
    fn random_order(&self) -> &'static str {
        "RANDOM()"
    }

    /// Wraps one side of a UNION. The flag is set when the operand has its
    /// own ORDER BY, LIMIT, OFFSET or unions.
    fn union_operand(&self, sql: &str, _compound: bool) -> String {
        format!("({sql})")
    }

    /// Trailing ESCAPE clause for LIKE patterns.
    fn like_escape(&self) -> &'static str {
        ""
    }

    /// Maps an abstract column type to the dialect's type.
    ///
    /// `string(64) NOT NULL` maps `string` and carries the size and
    /// modifiers over. Unknown types are returned unchanged.
    fn column_type(&self, definition: &str) -> String {
        let Some(caps) = COLUMN_TYPE_RE.captures(definition.trim()) else {
            return definition.to_string();
        };
        let Some((_, mapped)) = self
            .column_types()
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&caps[1]))
        else {
            return definition.to_string();
        };
        let mut sql = (*mapped).to_string();
        if let Some(size) = caps.get(2) {
            let size = format!("({})", size.as_str());
            sql = if TYPE_SIZE_RE.is_match(&sql) {
                TYPE_SIZE_RE.replace(&sql, NoExpand(&size)).into_owned()
            } else {
                format!("{sql}{size}")
            };
        }
        sql.push_str(caps.get(3).map_or("", |rest| rest.as_str()));
        sql
    }

    // DDL

    /// Renders any schema operation.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NotSupported`] when the dialect cannot express
    /// the operation.
    fn generate_sql(&self, op: &DdlOperation) -> Result<String> {
        match op {
            DdlOperation::CreateTable(op) => self.create_table(op),
            DdlOperation::DropTable(op) => self.drop_table(op),
            DdlOperation::RenameTable(op) => self.rename_table(op),
            DdlOperation::TruncateTable(op) => self.truncate_table(op),
            DdlOperation::AddColumn(op) => self.add_column(op),
            DdlOperation::DropColumn(op) => self.drop_column(op),
            DdlOperation::RenameColumn(op) => self.rename_column(op),
            DdlOperation::AlterColumn(op) => self.alter_column(op),
            DdlOperation::AddPrimaryKey(op) => self.add_primary_key(op),
            DdlOperation::DropPrimaryKey(op) => self.drop_primary_key(op),
            DdlOperation::AddForeignKey(op) => self.add_foreign_key(op),
            DdlOperation::DropForeignKey(op) => self.drop_foreign_key(op),
            DdlOperation::CreateIndex(op) => self.create_index(op),
            DdlOperation::DropIndex(op) => self.drop_index(op),
            DdlOperation::ResetSequence(op) => self.reset_sequence(op),
            DdlOperation::CheckIntegrity(op) => self.check_integrity(op),
        }
    }

    /// `CREATE TABLE [IF NOT EXISTS] t (...)` or `CREATE TABLE t <raw body>`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::IncompleteStatement`] for an empty column list.
    fn create_table(&self, op: &CreateTableOp) -> Result<String> {
        let head = if op.if_not_exists {
            "CREATE TABLE IF NOT EXISTS"
        } else {
            "CREATE TABLE"
        };
        let table = self.quote_table_name(&op.name);
        let mut sql = match &op.body {
            TableBody::Columns(elements) => {
                if elements.is_empty() {
                    return Err(QueryError::IncompleteStatement(format!(
                        "table '{}' has no columns",
                        op.name
                    )));
                }
                let lines: Vec<String> = elements
                    .iter()
                    .map(|element| match element {
                        TableElement::Column { name, definition } => format!(
                            "{} {}",
                            self.quote_column_name(name),
                            self.column_type(definition)
                        ),
                        TableElement::Constraint(sql) => self.quote_sql(sql),
                    })
                    .collect();
                format!("{head} {table} (\n\t{}\n)", lines.join(",\n\t"))
            }
            TableBody::Raw(body) => format!("{head} {table} {}", self.quote_sql(body.trim())),
        };
        if let Some(options) = &op.options {
            sql.push(' ');
            sql.push_str(options);
        }
        Ok(sql)
    }

    /// `DROP TABLE [IF EXISTS] t [CASCADE]`.
    ///
    /// # Errors
    ///
    /// Dialects without `CASCADE` return [`QueryError::NotSupported`].
    fn drop_table(&self, op: &DropTableOp) -> Result<String> {
        let if_exists = if op.if_exists { " IF EXISTS" } else { "" };
        let cascade = if op.cascade { " CASCADE" } else { "" };
        Ok(format!(
            "DROP TABLE{if_exists} {}{cascade}",
            self.quote_table_name(&op.name)
        ))
    }

    /// `ALTER TABLE a RENAME TO b`.
    ///
    /// # Errors
    ///
    /// Infallible by default.
    fn rename_table(&self, op: &RenameTableOp) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} RENAME TO {}",
            self.quote_table_name(&op.old_name),
            self.quote_table_name(&op.new_name)
        ))
    }

    /// `TRUNCATE TABLE t`.
    ///
    /// # Errors
    ///
    /// Infallible by default.
    fn truncate_table(&self, op: &TruncateTableOp) -> Result<String> {
        Ok(format!("TRUNCATE TABLE {}", self.quote_table_name(&op.name)))
    }

    /// `ALTER TABLE t ADD COLUMN c type`.
    ///
    /// # Errors
    ///
    /// Infallible by default.
    fn add_column(&self, op: &AddColumnOp) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            self.quote_table_name(&op.table),
            self.quote_column_name(&op.column),
            self.column_type(&op.definition)
        ))
    }

    /// `ALTER TABLE t DROP COLUMN c`.
    ///
    /// # Errors
    ///
    /// Infallible by default.
    fn drop_column(&self, op: &DropColumnOp) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.quote_table_name(&op.table),
            self.quote_column_name(&op.column)
        ))
    }

    /// `ALTER TABLE t RENAME COLUMN a TO b`.
    ///
    /// # Errors
    ///
    /// Propagates driver errors where the dialect inspects the table.
    fn rename_column(&self, op: &RenameColumnOp) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            self.quote_table_name(&op.table),
            self.quote_column_name(&op.old_name),
            self.quote_column_name(&op.new_name)
        ))
    }

    /// `ALTER TABLE t ALTER COLUMN c TYPE type`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NotSupported`] where columns cannot be altered.
    fn alter_column(&self, op: &AlterColumnOp) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} ALTER COLUMN {} TYPE {}",
            self.quote_table_name(&op.table),
            self.quote_column_name(&op.column),
            self.column_type(&op.definition)
        ))
    }

    /// `ALTER TABLE t ADD CONSTRAINT name PRIMARY KEY (cols)`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NotSupported`] where constraints cannot be added.
    fn add_primary_key(&self, op: &AddPrimaryKeyOp) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} PRIMARY KEY ({})",
            self.quote_table_name(&op.table),
            self.quote_column_name(&op.name),
            self.column_list(&op.columns)
        ))
    }

    /// `ALTER TABLE t DROP CONSTRAINT name`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NotSupported`] where constraints cannot be dropped.
    fn drop_primary_key(&self, op: &DropPrimaryKeyOp) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            self.quote_table_name(&op.table),
            self.quote_column_name(&op.name)
        ))
    }

    /// `ALTER TABLE t ADD CONSTRAINT name FOREIGN KEY (cols) REFERENCES r (cols)`
    /// with optional ON DELETE / ON UPDATE actions.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NotSupported`] where constraints cannot be added.
    fn add_foreign_key(&self, op: &AddForeignKeyOp) -> Result<String> {
        let mut sql = format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            self.quote_table_name(&op.table),
            self.quote_column_name(&op.name),
            self.column_list(&op.columns),
            self.quote_table_name(&op.ref_table),
            self.column_list(&op.ref_columns)
        );
        if let Some(action) = op.on_delete {
            sql.push_str(" ON DELETE ");
            sql.push_str(action.as_sql());
        }
        if let Some(action) = op.on_update {
            sql.push_str(" ON UPDATE ");
            sql.push_str(action.as_sql());
        }
        Ok(sql)
    }

    /// `ALTER TABLE t DROP CONSTRAINT name`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NotSupported`] where constraints cannot be dropped.
    fn drop_foreign_key(&self, op: &DropForeignKeyOp) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            self.quote_table_name(&op.table),
            self.quote_column_name(&op.name)
        ))
    }

    /// `CREATE [UNIQUE] INDEX name ON t (cols)`.
    ///
    /// # Errors
    ///
    /// Infallible by default.
    fn create_index(&self, op: &CreateIndexOp) -> Result<String> {
        let unique = if op.unique { "UNIQUE " } else { "" };
        Ok(format!(
            "CREATE {unique}INDEX {} ON {} ({})",
            self.quote_table_name(&op.name),
            self.quote_table_name(&op.table),
            self.column_list(&op.columns)
        ))
    }

    /// `DROP INDEX name`.
    ///
    /// # Errors
    ///
    /// Infallible by default.
    fn drop_index(&self, op: &DropIndexOp) -> Result<String> {
        Ok(format!("DROP INDEX {}", self.quote_table_name(&op.name)))
    }

    /// Sets the next auto-increment value of a table.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NotSupported`] unless the dialect overrides it.
    fn reset_sequence(&self, _op: &ResetSequenceOp) -> Result<String> {
        Err(QueryError::not_supported(self.name(), "sequence reset"))
    }

    /// Enables or disables foreign key checks.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NotSupported`] unless the dialect overrides it.
    fn check_integrity(&self, _op: &CheckIntegrityOp) -> Result<String> {
        Err(QueryError::not_supported(self.name(), "integrity check toggling"))
    }

    /// Quotes and comma-joins column names.
    fn column_list(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|column| self.quote_column_name(column))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("mysql".parse::<Dialect>().unwrap(), Dialect::MySql);
        assert_eq!("PostgreSQL".parse::<Dialect>().unwrap(), Dialect::PostgreSql);
        assert_eq!("pgsql".parse::<Dialect>().unwrap(), Dialect::PostgreSql);
        assert_eq!("sqlite3".parse::<Dialect>().unwrap(), Dialect::Sqlite);
        let err = "oracle".parse::<Dialect>().unwrap_err();
        assert!(matches!(err, QueryError::UnknownSource(ref s) if s == "oracle"));
    }

    #[test]
    fn test_dialect_serde() {
        let dialect: Dialect = serde_json::from_str("\"postgres\"").unwrap();
        assert_eq!(dialect, Dialect::PostgreSql);
        assert_eq!(serde_json::to_string(&Dialect::Sqlite).unwrap(), "\"sqlite\"");
    }

    #[test]
    fn test_quote_sql_with_prefix() {
        let adapter = SqliteAdapter::new().with_options(AdapterOptions {
            table_prefix: "app_".into(),
        });
        assert_eq!(
            adapter.quote_sql("SELECT [[t]].[[id]] FROM {{%user}} AS [[t]]"),
            "SELECT `t`.`id` FROM `app_user` AS `t`"
        );
        assert_eq!(adapter.raw_table_name("{{%test}}"), "app_test");
        assert_eq!(adapter.raw_table_name("test"), "test");
    }

    #[test]
    fn test_quoting_is_idempotent() {
        let adapter = PostgresAdapter::new();
        assert_eq!(adapter.quote_column_name("t.id"), "\"t\".\"id\"");
        assert_eq!(adapter.quote_column_name("\"t\".\"id\""), "\"t\".\"id\"");
        assert_eq!(adapter.quote_column_name("t.*"), "\"t\".*");
        assert_eq!(adapter.quote_column_name("COUNT(*)"), "COUNT(*)");
        assert_eq!(adapter.quote_table_name("public.user"), "\"public\".\"user\"");
    }

    #[test]
    fn test_non_finite_floats_render_null() {
        let adapter = SqliteAdapter::new();
        assert_eq!(adapter.quote_value(&SqlValue::Float(1.5)), "1.5");
        assert_eq!(adapter.quote_value(&SqlValue::Float(f64::NAN)), "NULL");
        assert_eq!(adapter.quote_value(&SqlValue::Float(f64::INFINITY)), "NULL");
        assert_eq!(
            adapter.quote_value(&SqlValue::Float(f64::NEG_INFINITY)),
            "NULL"
        );
    }

    #[test]
    fn test_names_with_quote_char_are_trusted() {
        let adapter = MysqlAdapter::new();
        assert_eq!(adapter.quote_simple_table_name("us`er"), "us`er");
        assert_eq!(adapter.quote_simple_column_name("na`me"), "na`me");
        assert_eq!(adapter.quote_simple_column_name("name"), "`name`");
    }

    #[test]
    fn test_column_type_mapping() {
        let adapter = MysqlAdapter::new();
        assert_eq!(adapter.column_type("string"), "varchar(255)");
        assert_eq!(adapter.column_type("string(64)"), "varchar(64)");
        assert_eq!(adapter.column_type("integer NOT NULL"), "int(11) NOT NULL");
        assert_eq!(adapter.column_type("varchar(10)"), "varchar(10)");
        assert_eq!(adapter.column_type("int(11)"), "int(11)");
    }
}
