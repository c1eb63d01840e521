//! # querykit-sqlite
//!
//! A blocking [`Driver`] for querykit backed by an sqlx SQLite pool.
//!
//! The query builder itself is synchronous, so this driver owns a small
//! tokio runtime and blocks on every call. It must not be used from inside
//! another async runtime.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use querykit_core::{AdapterOptions, Driver, QueryBuilderFactory};
//! use querykit_sqlite::SqliteDriver;
//!
//! let driver = Arc::new(SqliteDriver::memory().unwrap());
//! let factory = QueryBuilderFactory::for_driver(driver.clone(), AdapterOptions::default()).unwrap();
//!
//! let create = factory
//!     .query_builder()
//!     .create_table("user", [("id", "pk"), ("email", "string")], "")
//!     .to_sql()
//!     .unwrap();
//! driver.execute(&create).unwrap();
//!
//! let mut reflector = factory.reflector().unwrap();
//! let table = reflector.table_schema("user", false).unwrap().unwrap();
//! assert_eq!(table.primary_key, vec!["id"]);
//! ```

use chrono::NaiveDateTime;
use querykit_core::date::parse_date_time;
use querykit_core::{Driver, QueryError, Row, SqlValue};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};
use tokio::runtime::Runtime;
use tracing::{debug, warn};

/// Errors raised while opening or using the SQLite connection.
#[derive(Debug, thiserror::Error)]
pub enum SqliteError {
    /// Database error reported by sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The blocking runtime could not be started.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SqliteError> for QueryError {
    fn from(err: SqliteError) -> Self {
        Self::driver(err)
    }
}

/// Result type for driver construction.
pub type Result<T> = std::result::Result<T, SqliteError>;

/// SQLite connection handle.
///
/// Uses a single pooled connection so `sqlite::memory:` databases keep their
/// contents for the lifetime of the driver.
#[derive(Debug)]
pub struct SqliteDriver {
    pool: SqlitePool,
    runtime: Runtime,
}

impl SqliteDriver {
    /// Opens a database, e.g. `sqlite:app.db` or `sqlite::memory:`.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot start or the database cannot
    /// be opened.
    pub fn open(url: &str) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;
        let pool = runtime.block_on(
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(url),
        )?;
        debug!(url, "Opened SQLite database");
        Ok(Self { pool, runtime })
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Same as [`SqliteDriver::open`].
    pub fn memory() -> Result<Self> {
        Self::open("sqlite::memory:")
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl Drop for SqliteDriver {
    fn drop(&mut self) {
        self.runtime.block_on(self.pool.close());
    }
}

impl Driver for SqliteDriver {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn execute(&self, sql: &str) -> querykit_core::Result<u64> {
        debug!(sql, "Executing statement");
        let result = self
            .runtime
            .block_on(sqlx::query(sql).execute(&self.pool))
            .map_err(SqliteError::from)?;
        Ok(result.rows_affected())
    }

    fn query_all(&self, sql: &str) -> querykit_core::Result<Vec<Row>> {
        debug!(sql, "Running query");
        let rows = self
            .runtime
            .block_on(sqlx::query(sql).fetch_all(&self.pool))
            .map_err(SqliteError::from)?;
        Ok(rows.iter().map(convert_row).collect())
    }

    fn now(&self) -> querykit_core::Result<Option<NaiveDateTime>> {
        match self.query_scalar("SELECT DATETIME('now')")? {
            Some(SqlValue::Text(text)) => parse_date_time(&text).map(Some),
            _ => Ok(None),
        }
    }
}

fn convert_row(row: &SqliteRow) -> Row {
    let mut converted = Row::new();
    for column in row.columns() {
        let value = decode_value(row, column.ordinal()).unwrap_or_else(|err| {
            warn!(column = column.name(), error = %err, "Could not decode value");
            SqlValue::Null
        });
        converted.push(column.name(), value);
    }
    converted
}

/// Decodes by the value's storage class rather than the declared type.
fn decode_value(row: &SqliteRow, index: usize) -> std::result::Result<SqlValue, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(SqlValue::Null);
    }
    let type_name = raw.type_info().name().to_ascii_uppercase();
    match type_name.as_str() {
        "INTEGER" | "BOOLEAN" => row.try_get::<i64, _>(index).map(SqlValue::Int),
        "REAL" => row.try_get::<f64, _>(index).map(SqlValue::Float),
        "BLOB" => row.try_get::<Vec<u8>, _>(index).map(SqlValue::Blob),
        _ => row.try_get::<String, _>(index).map(SqlValue::Text),
    }
}
