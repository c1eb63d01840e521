//! Cached schema reflection.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::debug;

use super::{TableLoader, TableSchema};
use crate::adapter::Adapter;
use crate::driver::Driver;
use crate::error::{QueryError, Result};

/// Reflects and caches table schemas of one database.
///
/// The cache belongs to the reflector instance. Schema changes made through
/// the driver are not noticed until the table is refreshed.
#[derive(Debug)]
pub struct SchemaReflector {
    driver: Arc<dyn Driver>,
    loader: Box<dyn TableLoader>,
    tables: HashMap<String, TableSchema>,
}

impl SchemaReflector {
    /// Creates a reflector with an explicit loader.
    #[must_use]
    pub fn new(driver: Arc<dyn Driver>, loader: Box<dyn TableLoader>) -> Self {
        Self {
            driver,
            loader,
            tables: HashMap::new(),
        }
    }

    /// Creates a reflector using the adapter's driver and loader.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::IncompleteStatement`] if the adapter has no
    /// driver attached.
    pub fn for_adapter(adapter: &dyn Adapter) -> Result<Self> {
        let driver = adapter.driver().cloned().ok_or_else(|| {
            QueryError::IncompleteStatement(format!(
                "{} adapter has no driver to reflect through",
                adapter.name()
            ))
        })?;
        Ok(Self::new(driver, adapter.table_loader()))
    }

    /// Returns the driver used for reflection.
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    /// Returns the schema of `name`, loading it on first access or when
    /// `refresh` is set. Returns `None` if the table does not exist.
    ///
    /// # Errors
    ///
    /// Propagates driver errors.
    pub fn table_schema(&mut self, name: &str, refresh: bool) -> Result<Option<&TableSchema>> {
        if refresh {
            self.tables.remove(name);
        } else if self.tables.contains_key(name) {
            debug!(table = name, "Schema cache hit");
            return Ok(self.tables.get(name));
        }

        debug!(table = name, refresh, "Loading table schema");
        match self.loader.load_table(self.driver.as_ref(), name)? {
            Some(schema) => Ok(Some(&*self.tables.entry(name.to_string()).or_insert(schema))),
            None => Ok(None),
        }
    }

    /// Returns the unique indexes of a table, queried live.
    ///
    /// # Errors
    ///
    /// Propagates driver errors.
    pub fn find_unique_indexes(
        &self,
        table: &TableSchema,
    ) -> Result<BTreeMap<String, Vec<String>>> {
        self.loader.unique_indexes(self.driver.as_ref(), table)
    }

    /// Lists the tables of the database.
    ///
    /// # Errors
    ///
    /// Propagates driver errors.
    pub fn table_names(&self) -> Result<Vec<String>> {
        self.loader.table_names(self.driver.as_ref())
    }

    /// Returns true if `name` is currently cached.
    #[must_use]
    pub fn is_cached(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Drops every cached schema.
    pub fn refresh(&mut self) {
        debug!(tables = self.tables.len(), "Clearing schema cache");
        self.tables.clear();
    }

    /// Drops the cached schema of one table.
    pub fn refresh_table(&mut self, name: &str) {
        if self.tables.remove(name).is_some() {
            debug!(table = name, "Evicted table schema");
        }
    }
}
