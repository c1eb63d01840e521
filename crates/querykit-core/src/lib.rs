//! # querykit-core
//!
//! A dialect-agnostic SQL query builder with Django-style field lookups.
//!
//! This crate provides:
//! - A condition tree ([`Q`]) built from `field__operator` keys
//! - A per-adapter lookup registry that turns leaves into predicates
//! - Adapters for MySQL, PostgreSQL and SQLite that own quoting, literal
//!   formats, paging syntax and DDL templates
//! - A fluent [`QueryBuilder`] for SELECT, INSERT, UPDATE, DELETE and schema
//!   statements
//! - A schema reflector that reads and caches table metadata through a
//!   [`Driver`] handle
//!
//! ## Building queries
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use querykit_core::adapter::PostgresAdapter;
//! use querykit_core::{q, QueryBuilder, Q};
//!
//! let qb = QueryBuilder::new(Arc::new(PostgresAdapter::new()))
//!     .from("user")
//!     .where_clause(q! { "is_active" => true })
//!     .and_where(Q::any([
//!         Q::lookup("name__istartswith", "adm"),
//!         Q::lookup("group_id__in", [1, 2]),
//!     ]));
//!
//! assert_eq!(
//!     qb.to_sql().unwrap(),
//!     "SELECT * FROM \"user\" WHERE \"is_active\"=TRUE AND \
//!      (\"name\" ILIKE 'adm%' OR \"group_id\" IN (1, 2))"
//! );
//! ```
//!
//! ## Bound parameters
//!
//! [`QueryBuilder::to_sql`] writes escaped literals into the text.
//! [`QueryBuilder::build`] writes placeholders instead and returns the values:
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use querykit_core::adapter::SqliteAdapter;
//! use querykit_core::{q, QueryBuilder, SqlValue};
//!
//! let user_input = "'; DROP TABLE users; --";
//! let (sql, params) = QueryBuilder::new(Arc::new(SqliteAdapter::new()))
//!     .select("id")
//!     .from("users")
//!     .where_clause(q! { "name" => user_input })
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(sql, "SELECT `id` FROM `users` WHERE `name`=?");
//! assert_eq!(params, vec![SqlValue::Text(user_input.to_string())]);
//! ```

pub mod adapter;
pub mod aggregation;
pub mod builder;
pub mod date;
pub mod driver;
pub mod error;
pub mod factory;
pub mod lookup;
pub mod q;
pub mod schema;
pub mod value;

pub use adapter::{Adapter, AdapterOptions, Dialect, MysqlAdapter, PostgresAdapter, SqliteAdapter};
pub use aggregation::{AggregateFunction, Aggregation};
pub use builder::{JoinType, QueryBuilder, QueryKind};
pub use date::DateInput;
pub use driver::{Driver, Row};
pub use error::{QueryError, Result};
pub use factory::{FactoryConfig, QueryBuilderFactory};
pub use lookup::{LookupBuilder, LookupRegistry};
pub use q::{Lookup, Q};
pub use schema::{ColumnSchema, SchemaReflector, TableSchema};
pub use value::{FilterValue, SqlValue, ToSqlValue};
