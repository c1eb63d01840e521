//! Table metadata reflected from a live database.
//!
//! These types describe a table as the database reports it. A
//! [`SchemaReflector`] loads them through a dialect-specific [`TableLoader`]
//! and caches them per table name.

mod loader;
mod reflector;

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub use loader::{MysqlLoader, PostgresLoader, SqliteLoader, TableLoader};
pub use reflector::SchemaReflector;

static SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*(\d+)").expect("valid size regex"));

/// A reflected column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name.
    pub name: String,
    /// Declared type, as reported by the database.
    pub db_type: String,
    /// Declared size or precision, e.g. `128` for `varchar(128)`.
    pub size: Option<u32>,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Whether the column is part of the primary key.
    pub primary_key: bool,
    /// Default value expression, as reported by the database.
    pub default: Option<String>,
}

impl ColumnSchema {
    /// Creates a nullable, non-key column, deriving the size from the type.
    #[must_use]
    pub fn new(name: impl Into<String>, db_type: impl Into<String>) -> Self {
        let db_type = db_type.into();
        Self {
            name: name.into(),
            size: parse_size(&db_type),
            db_type,
            nullable: true,
            primary_key: false,
            default: None,
        }
    }
}

/// A reflected foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeySchema {
    /// Referencing columns, in key order.
    pub columns: Vec<String>,
    /// Referenced table.
    pub ref_table: String,
    /// Referenced columns, in key order.
    pub ref_columns: Vec<String>,
}

/// A reflected index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSchema {
    /// Indexed columns, in index order.
    pub columns: Vec<String>,
    /// Whether the index is unique.
    pub unique: bool,
}

/// A reflected table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name.
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnSchema>,
    /// Primary key columns, in key order.
    pub primary_key: Vec<String>,
    /// Foreign keys by constraint name.
    pub foreign_keys: BTreeMap<String, ForeignKeySchema>,
    /// Indexes by name.
    pub indexes: BTreeMap<String, IndexSchema>,
}

impl TableSchema {
    /// Creates an empty schema for `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            foreign_keys: BTreeMap::new(),
            indexes: BTreeMap::new(),
        }
    }

    /// Returns a column by name.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Returns the column names in declaration order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    /// Sets `primary_key` on the columns listed in the primary key.
    pub(crate) fn mark_primary_key(&mut self) {
        for column in &mut self.columns {
            column.primary_key = self.primary_key.contains(&column.name);
        }
    }
}

/// Extracts the size from a declared type such as `varchar(128)` or
/// `decimal(10,2)`.
#[must_use]
pub fn parse_size(db_type: &str) -> Option<u32> {
    SIZE_RE
        .captures(db_type)
        .and_then(|caps| caps[1].parse().ok())
}
