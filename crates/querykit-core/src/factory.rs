//! Builder construction from a driver or from configuration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapter::{
    Adapter, AdapterOptions, Dialect, MysqlAdapter, PostgresAdapter, SqliteAdapter,
};
use crate::builder::QueryBuilder;
use crate::driver::Driver;
use crate::error::Result;
use crate::schema::SchemaReflector;

/// Builder configuration a host application can embed in its own config.
///
/// ```
/// use querykit_core::FactoryConfig;
///
/// let config: FactoryConfig =
///     serde_json::from_str(r#"{"dialect": "postgres", "table_prefix": "app_"}"#).unwrap();
/// assert_eq!(config.table_prefix, "app_");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryConfig {
    /// Target dialect.
    pub dialect: Dialect,
    /// Prefix for `{{%table}}` placeholders.
    #[serde(default)]
    pub table_prefix: String,
}

impl Dialect {
    /// Creates this dialect's adapter, optionally attached to a driver.
    #[must_use]
    pub fn adapter(
        self,
        options: AdapterOptions,
        driver: Option<Arc<dyn Driver>>,
    ) -> Arc<dyn Adapter> {
        match (self, driver) {
            (Self::MySql, None) => Arc::new(MysqlAdapter::new().with_options(options)),
            (Self::MySql, Some(driver)) => {
                Arc::new(MysqlAdapter::new().with_options(options).with_driver(driver))
            }
            (Self::PostgreSql, None) => Arc::new(PostgresAdapter::new().with_options(options)),
            (Self::PostgreSql, Some(driver)) => Arc::new(
                PostgresAdapter::new()
                    .with_options(options)
                    .with_driver(driver),
            ),
            (Self::Sqlite, None) => Arc::new(SqliteAdapter::new().with_options(options)),
            (Self::Sqlite, Some(driver)) => {
                Arc::new(SqliteAdapter::new().with_options(options).with_driver(driver))
            }
        }
    }
}

/// Hands out query builders bound to one adapter.
#[derive(Debug, Clone)]
pub struct QueryBuilderFactory {
    adapter: Arc<dyn Adapter>,
}

impl QueryBuilderFactory {
    /// Creates a factory for an adapter.
    #[must_use]
    pub fn new(adapter: Arc<dyn Adapter>) -> Self {
        Self { adapter }
    }

    /// Creates a factory for a driver, picking the adapter from the
    /// driver's name.
    ///
    /// # Errors
    ///
    /// Returns [`crate::QueryError::UnknownSource`] if no adapter handles
    /// the driver.
    pub fn for_driver(driver: Arc<dyn Driver>, options: AdapterOptions) -> Result<Self> {
        let dialect: Dialect = driver.name().parse()?;
        debug!(driver = driver.name(), %dialect, "Selected adapter for driver");
        Ok(Self::new(dialect.adapter(options, Some(driver))))
    }

    /// Creates a factory from configuration, without a driver.
    #[must_use]
    pub fn from_config(config: &FactoryConfig) -> Self {
        let options = AdapterOptions {
            table_prefix: config.table_prefix.clone(),
        };
        Self::new(config.dialect.adapter(options, None))
    }

    /// Returns the adapter.
    #[must_use]
    pub fn adapter(&self) -> &Arc<dyn Adapter> {
        &self.adapter
    }

    /// Creates an empty builder.
    #[must_use]
    pub fn query_builder(&self) -> QueryBuilder {
        QueryBuilder::new(Arc::clone(&self.adapter))
    }

    /// Creates a schema reflector over the adapter's driver.
    ///
    /// # Errors
    ///
    /// Returns [`crate::QueryError::IncompleteStatement`] if the adapter has
    /// no driver.
    pub fn reflector(&self) -> Result<SchemaReflector> {
        SchemaReflector::for_adapter(self.adapter.as_ref())
    }
}
