//! Dialect-specific metadata queries.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use super::{ColumnSchema, ForeignKeySchema, IndexSchema, TableSchema};
use crate::driver::{Driver, Row};
use crate::error::Result;
use crate::value::SqlValue;

/// Loads table metadata through a driver.
pub trait TableLoader: fmt::Debug + Send + Sync {
    /// Loads one table, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Propagates driver errors.
    fn load_table(&self, driver: &dyn Driver, name: &str) -> Result<Option<TableSchema>>;

    /// Lists the tables of the current database.
    ///
    /// # Errors
    ///
    /// Propagates driver errors.
    fn table_names(&self, driver: &dyn Driver) -> Result<Vec<String>>;

    /// Returns the unique indexes of a table, including the primary key
    /// index where the database reports one.
    ///
    /// # Errors
    ///
    /// Propagates driver errors.
    fn unique_indexes(
        &self,
        driver: &dyn Driver,
        table: &TableSchema,
    ) -> Result<BTreeMap<String, Vec<String>>>;
}

fn literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn backtick(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn text_of(row: &Row, column: &str) -> Option<String> {
    row.get(column).and_then(SqlValue::to_plain_string)
}

/// Folds `(index, column, unique)` rows, already in column order, into a map.
fn collect_indexes<I>(entries: I) -> BTreeMap<String, IndexSchema>
where
    I: IntoIterator<Item = (String, String, bool)>,
{
    let mut indexes: BTreeMap<String, IndexSchema> = BTreeMap::new();
    for (name, column, unique) in entries {
        indexes
            .entry(name)
            .or_insert_with(|| IndexSchema {
                columns: Vec::new(),
                unique,
            })
            .columns
            .push(column);
    }
    indexes
}

/// Folds `(constraint, column, ref_table, ref_column)` rows into a map.
fn collect_foreign_keys<I>(entries: I) -> BTreeMap<String, ForeignKeySchema>
where
    I: IntoIterator<Item = (String, String, String, String)>,
{
    let mut keys: BTreeMap<String, ForeignKeySchema> = BTreeMap::new();
    for (name, column, ref_table, ref_column) in entries {
        let key = keys.entry(name).or_insert_with(|| ForeignKeySchema {
            columns: Vec::new(),
            ref_table,
            ref_columns: Vec::new(),
        });
        key.columns.push(column);
        key.ref_columns.push(ref_column);
    }
    keys
}

fn unique_only(indexes: BTreeMap<String, IndexSchema>) -> BTreeMap<String, Vec<String>> {
    indexes
        .into_iter()
        .filter(|(_, index)| index.unique)
        .map(|(name, index)| (name, index.columns))
        .collect()
}

/// SQLite metadata via `PRAGMA` statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteLoader;

impl SqliteLoader {
    fn load_indexes(driver: &dyn Driver, table: &str) -> Result<BTreeMap<String, IndexSchema>> {
        let mut entries = Vec::new();
        for index in driver.query_all(&format!("PRAGMA index_list({})", backtick(table)))? {
            let Some(name) = text_of(&index, "name") else {
                continue;
            };
            let unique = index.get_bool("unique").unwrap_or(false);
            for column in driver.query_all(&format!("PRAGMA index_info({})", backtick(&name)))? {
                if let Some(column) = text_of(&column, "name") {
                    entries.push((name.clone(), column, unique));
                }
            }
        }
        Ok(collect_indexes(entries))
    }
}

impl TableLoader for SqliteLoader {
    fn load_table(&self, driver: &dyn Driver, name: &str) -> Result<Option<TableSchema>> {
        let rows = driver.query_all(&format!("PRAGMA table_info({})", backtick(name)))?;
        if rows.is_empty() {
            debug!(table = name, "Table not found");
            return Ok(None);
        }

        let mut table = TableSchema::new(name);
        let mut key_columns = Vec::new();
        for row in &rows {
            let Some(column_name) = text_of(row, "name") else {
                continue;
            };
            let mut column =
                ColumnSchema::new(column_name.clone(), text_of(row, "type").unwrap_or_default());
            column.nullable = !row.get_bool("notnull").unwrap_or(false);
            column.default = text_of(row, "dflt_value");
            let position = row.get_i64("pk").unwrap_or(0);
            if position > 0 {
                key_columns.push((position, column_name));
            }
            table.columns.push(column);
        }
        key_columns.sort_by_key(|(position, _)| *position);
        table.primary_key = key_columns.into_iter().map(|(_, name)| name).collect();
        table.mark_primary_key();

        let keys = driver.query_all(&format!("PRAGMA foreign_key_list({})", backtick(name)))?;
        table.foreign_keys = collect_foreign_keys(keys.iter().filter_map(|row| {
            Some((
                format!("fk_{}", row.get_i64("id")?),
                text_of(row, "from")?,
                text_of(row, "table")?,
                text_of(row, "to")?,
            ))
        }));
        table.indexes = Self::load_indexes(driver, name)?;
        Ok(Some(table))
    }

    fn table_names(&self, driver: &dyn Driver) -> Result<Vec<String>> {
        let rows = driver.query_all(
            "SELECT DISTINCT tbl_name FROM sqlite_master \
             WHERE type='table' AND tbl_name<>'sqlite_sequence' ORDER BY tbl_name",
        )?;
        Ok(rows.iter().filter_map(|row| text_of(row, "tbl_name")).collect())
    }

    fn unique_indexes(
        &self,
        driver: &dyn Driver,
        table: &TableSchema,
    ) -> Result<BTreeMap<String, Vec<String>>> {
        Ok(unique_only(Self::load_indexes(driver, &table.name)?))
    }
}

/// PostgreSQL metadata via `information_schema` and the `pg_index` catalog.
#[derive(Debug, Clone)]
pub struct PostgresLoader {
    /// Schema used for unqualified table names.
    pub default_schema: String,
}

impl Default for PostgresLoader {
    fn default() -> Self {
        Self {
            default_schema: String::from("public"),
        }
    }
}

impl PostgresLoader {
    fn split<'a>(&'a self, name: &'a str) -> (&'a str, &'a str) {
        name.split_once('.')
            .unwrap_or((self.default_schema.as_str(), name))
    }

    fn regclass(schema: &str, table: &str) -> String {
        let quoted = format!(
            "\"{}\".\"{}\"",
            schema.replace('"', "\"\""),
            table.replace('"', "\"\"")
        );
        format!("{}::regclass", literal(&quoted))
    }

    fn load_indexes(
        driver: &dyn Driver,
        schema: &str,
        table: &str,
    ) -> Result<BTreeMap<String, IndexSchema>> {
        let rows = driver.query_all(&format!(
            "SELECT ic.relname AS index_name, a.attname AS column_name, \
             i.indisunique AS is_unique, i.indisprimary AS is_primary \
             FROM pg_index i \
             JOIN pg_class ic ON ic.oid = i.indexrelid \
             JOIN pg_attribute a ON a.attrelid = i.indrelid AND a.attnum = ANY(i.indkey) \
             WHERE i.indrelid = {} \
             ORDER BY ic.relname, array_position(i.indkey::int2[], a.attnum)",
            Self::regclass(schema, table)
        ))?;
        Ok(collect_indexes(rows.iter().filter_map(|row| {
            Some((
                text_of(row, "index_name")?,
                text_of(row, "column_name")?,
                row.get_bool("is_unique").unwrap_or(false),
            ))
        })))
    }
}

impl TableLoader for PostgresLoader {
    fn load_table(&self, driver: &dyn Driver, name: &str) -> Result<Option<TableSchema>> {
        let (schema, table_name) = self.split(name);
        let rows = driver.query_all(&format!(
            "SELECT column_name, data_type, character_maximum_length, numeric_precision, \
             is_nullable, column_default \
             FROM information_schema.columns \
             WHERE table_schema = {} AND table_name = {} \
             ORDER BY ordinal_position",
            literal(schema),
            literal(table_name)
        ))?;
        if rows.is_empty() {
            debug!(table = name, "Table not found");
            return Ok(None);
        }

        let mut table = TableSchema::new(name);
        for row in &rows {
            let Some(column_name) = text_of(row, "column_name") else {
                continue;
            };
            let mut column =
                ColumnSchema::new(column_name, text_of(row, "data_type").unwrap_or_default());
            let size = row
                .get_i64("character_maximum_length")
                .or_else(|| row.get_i64("numeric_precision"));
            column.size = size.and_then(|size| u32::try_from(size).ok());
            column.nullable = row.get_bool("is_nullable").unwrap_or(true);
            column.default = text_of(row, "column_default");
            table.columns.push(column);
        }

        let indexes = Self::load_indexes(driver, schema, table_name)?;
        let keys = driver.query_all(&format!(
            "SELECT a.attname AS column_name \
             FROM pg_index i \
             JOIN pg_attribute a ON a.attrelid = i.indrelid AND a.attnum = ANY(i.indkey) \
             WHERE i.indrelid = {} AND i.indisprimary \
             ORDER BY array_position(i.indkey::int2[], a.attnum)",
            Self::regclass(schema, table_name)
        ))?;
        table.primary_key = keys
            .iter()
            .filter_map(|row| text_of(row, "column_name"))
            .collect();
        table.mark_primary_key();

        let foreign = driver.query_all(&format!(
            "SELECT tc.constraint_name, kcu.column_name, \
             ccu.table_name AS foreign_table_name, ccu.column_name AS foreign_column_name \
             FROM information_schema.table_constraints tc \
             JOIN information_schema.key_column_usage kcu \
             ON tc.constraint_name = kcu.constraint_name AND tc.table_schema = kcu.table_schema \
             JOIN information_schema.constraint_column_usage ccu \
             ON ccu.constraint_name = tc.constraint_name AND ccu.table_schema = tc.table_schema \
             WHERE tc.constraint_type = 'FOREIGN KEY' \
             AND tc.table_schema = {} AND tc.table_name = {} \
             ORDER BY tc.constraint_name, kcu.ordinal_position",
            literal(schema),
            literal(table_name)
        ))?;
        table.foreign_keys = collect_foreign_keys(foreign.iter().filter_map(|row| {
            Some((
                text_of(row, "constraint_name")?,
                text_of(row, "column_name")?,
                text_of(row, "foreign_table_name")?,
                text_of(row, "foreign_column_name")?,
            ))
        }));
        table.indexes = indexes;
        Ok(Some(table))
    }

    fn table_names(&self, driver: &dyn Driver) -> Result<Vec<String>> {
        let rows = driver.query_all(&format!(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = {} AND table_type = 'BASE TABLE' ORDER BY table_name",
            literal(&self.default_schema)
        ))?;
        Ok(rows
            .iter()
            .filter_map(|row| text_of(row, "table_name"))
            .collect())
    }

    fn unique_indexes(
        &self,
        driver: &dyn Driver,
        table: &TableSchema,
    ) -> Result<BTreeMap<String, Vec<String>>> {
        let (schema, table_name) = self.split(&table.name);
        Ok(unique_only(Self::load_indexes(driver, schema, table_name)?))
    }
}

/// MySQL metadata via `SHOW` statements and `information_schema`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlLoader;

impl MysqlLoader {
    fn qualified(name: &str) -> String {
        name.split('.').map(backtick).collect::<Vec<_>>().join(".")
    }

    fn schema_filter(name: &str) -> (String, String) {
        match name.split_once('.') {
            Some((schema, table)) => (literal(schema), literal(table)),
            None => (String::from("DATABASE()"), literal(name)),
        }
    }

    fn load_indexes(driver: &dyn Driver, name: &str) -> Result<BTreeMap<String, IndexSchema>> {
        let rows = driver.query_all(&format!("SHOW INDEX FROM {}", Self::qualified(name)))?;
        Ok(collect_indexes(rows.iter().filter_map(|row| {
            Some((
                text_of(row, "Key_name")?,
                text_of(row, "Column_name")?,
                !row.get_bool("Non_unique").unwrap_or(true),
            ))
        })))
    }
}

impl TableLoader for MysqlLoader {
    fn load_table(&self, driver: &dyn Driver, name: &str) -> Result<Option<TableSchema>> {
        let (schema, table_name) = Self::schema_filter(name);
        let exists = driver.query_scalar(&format!(
            "SELECT COUNT(*) FROM information_schema.TABLES \
             WHERE TABLE_SCHEMA = {schema} AND TABLE_NAME = {table_name}"
        ))?;
        if exists.and_then(|count| count.as_i64()).unwrap_or(0) == 0 {
            debug!(table = name, "Table not found");
            return Ok(None);
        }

        let mut table = TableSchema::new(name);
        let rows = driver.query_all(&format!(
            "SHOW FULL COLUMNS FROM {}",
            Self::qualified(name)
        ))?;
        let mut key_columns = Vec::new();
        for row in &rows {
            let Some(column_name) = text_of(row, "Field") else {
                continue;
            };
            let mut column =
                ColumnSchema::new(column_name.clone(), text_of(row, "Type").unwrap_or_default());
            column.nullable = row.get_bool("Null").unwrap_or(true);
            column.default = text_of(row, "Default");
            if row.get_str("Key") == Some("PRI") {
                key_columns.push(column_name);
            }
            table.columns.push(column);
        }

        table.indexes = Self::load_indexes(driver, name)?;
        table.primary_key = table
            .indexes
            .get("PRIMARY")
            .map_or(key_columns, |index| index.columns.clone());
        table.mark_primary_key();

        let foreign = driver.query_all(&format!(
            "SELECT CONSTRAINT_NAME, COLUMN_NAME, REFERENCED_TABLE_NAME, REFERENCED_COLUMN_NAME \
             FROM information_schema.KEY_COLUMN_USAGE \
             WHERE TABLE_SCHEMA = {schema} AND TABLE_NAME = {table_name} \
             AND REFERENCED_TABLE_NAME IS NOT NULL \
             ORDER BY CONSTRAINT_NAME, ORDINAL_POSITION"
        ))?;
        table.foreign_keys = collect_foreign_keys(foreign.iter().filter_map(|row| {
            Some((
                text_of(row, "CONSTRAINT_NAME")?,
                text_of(row, "COLUMN_NAME")?,
                text_of(row, "REFERENCED_TABLE_NAME")?,
                text_of(row, "REFERENCED_COLUMN_NAME")?,
            ))
        }));
        Ok(Some(table))
    }

    fn table_names(&self, driver: &dyn Driver) -> Result<Vec<String>> {
        let rows = driver.query_all("SHOW TABLES")?;
        Ok(rows
            .iter()
            .filter_map(|row| row.values().first().and_then(SqlValue::to_plain_string))
            .collect())
    }

    fn unique_indexes(
        &self,
        driver: &dyn Driver,
        table: &TableSchema,
    ) -> Result<BTreeMap<String, Vec<String>>> {
        Ok(unique_only(Self::load_indexes(driver, &table.name)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_indexes_keeps_column_order() {
        let indexes = collect_indexes(vec![
            ("idx".to_string(), "b".to_string(), true),
            ("idx".to_string(), "a".to_string(), true),
            ("other".to_string(), "c".to_string(), false),
        ]);
        assert_eq!(indexes["idx"].columns, vec!["b", "a"]);
        assert!(indexes["idx"].unique);
        let unique = unique_only(indexes);
        assert_eq!(unique.len(), 1);
        assert!(unique.contains_key("idx"));
    }

    #[test]
    fn test_postgres_split() {
        let loader = PostgresLoader::default();
        assert_eq!(loader.split("user"), ("public", "user"));
        assert_eq!(loader.split("audit.log"), ("audit", "log"));
        assert_eq!(
            PostgresLoader::regclass("public", "user"),
            "'\"public\".\"user\"'::regclass"
        );
    }

    #[test]
    fn test_mysql_qualified() {
        assert_eq!(MysqlLoader::qualified("db.user"), "`db`.`user`");
        assert_eq!(
            MysqlLoader::schema_filter("user"),
            (String::from("DATABASE()"), String::from("'user'"))
        );
    }
}
