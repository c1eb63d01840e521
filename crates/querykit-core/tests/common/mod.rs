#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use querykit_core::adapter::{Adapter, MysqlAdapter, PostgresAdapter, SqliteAdapter};
use querykit_core::{Driver, QueryBuilder, Result, Row};

/// One adapter per dialect, without a driver.
pub fn adapters() -> Vec<Arc<dyn Adapter>> {
    vec![
        Arc::new(MysqlAdapter::new()),
        Arc::new(PostgresAdapter::new()),
        Arc::new(SqliteAdapter::new()),
    ]
}

pub fn mysql() -> QueryBuilder {
    QueryBuilder::new(Arc::new(MysqlAdapter::new()))
}

pub fn pgsql() -> QueryBuilder {
    QueryBuilder::new(Arc::new(PostgresAdapter::new()))
}

pub fn sqlite() -> QueryBuilder {
    QueryBuilder::new(Arc::new(SqliteAdapter::new()))
}

/// Renders `qb` and compares it against `expected` after placeholder
/// expansion for the builder's adapter.
pub fn assert_sql(qb: &QueryBuilder, expected: &str) {
    let adapter = qb.adapter();
    let sql = qb
        .to_sql()
        .unwrap_or_else(|e| panic!("Failed to render for {}: {e}", adapter.name()));
    assert_eq!(sql, adapter.quote_sql(expected), "dialect: {}", adapter.name());
}

/// A driver answering queries from a script of exact SQL strings.
///
/// Unknown queries return no rows. Executed statements are recorded.
#[derive(Debug)]
pub struct MockDriver {
    name: String,
    responses: Mutex<HashMap<String, Vec<Row>>>,
    executed: Mutex<Vec<String>>,
}

impl MockDriver {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            responses: Mutex::new(HashMap::new()),
            executed: Mutex::new(Vec::new()),
        }
    }

    /// Sets the rows returned for `sql`, replacing earlier ones.
    pub fn respond(&self, sql: &str, rows: Vec<Row>) {
        self.responses
            .lock()
            .unwrap()
            .insert(sql.to_string(), rows);
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

impl Driver for MockDriver {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, sql: &str) -> Result<u64> {
        self.executed.lock().unwrap().push(sql.to_string());
        Ok(0)
    }

    fn query_all(&self, sql: &str) -> Result<Vec<Row>> {
        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(sql)
            .cloned()
            .unwrap_or_default())
    }
}

/// A `PRAGMA table_info` row.
pub fn sqlite_column(name: &str, db_type: &str, not_null: bool, pk: i64) -> Row {
    Row::new()
        .with("cid", 0_i64)
        .with("name", name)
        .with("type", db_type)
        .with("notnull", i64::from(not_null))
        .with("dflt_value", None::<&str>)
        .with("pk", pk)
}
