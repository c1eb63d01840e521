//! Error types for query construction and schema reflection.

/// Errors that can occur while compiling queries or reflecting schemas.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// A condition leaf references an operator the adapter does not know.
    #[error("Unknown lookup '{lookup}' for field '{field}'")]
    UnknownLookup {
        /// Field the lookup was applied to.
        field: String,
        /// The unregistered operator suffix.
        lookup: String,
    },

    /// A lookup received a value it cannot render.
    #[error("Invalid value for lookup '{lookup}': {reason}")]
    InvalidLookupValue {
        /// The lookup name.
        lookup: String,
        /// What was wrong with the value.
        reason: String,
    },

    /// The target dialect cannot express the requested feature.
    #[error("{dialect} does not support {feature}")]
    NotSupported {
        /// Dialect name.
        dialect: String,
        /// The unsupported feature.
        feature: String,
    },

    /// No adapter recognizes the requested data source.
    #[error("Unknown data source: {0}")]
    UnknownSource(String),

    /// A date or timestamp could not be parsed.
    #[error("Invalid date value: {0}")]
    InvalidDate(String),

    /// A filter document could not be turned into a condition tree.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// The statement is missing a part it needs to render.
    #[error("Incomplete statement: {0}")]
    IncompleteStatement(String),

    /// Error reported by a driver handle.
    #[error("Driver error: {0}")]
    Driver(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl QueryError {
    /// Creates a `NotSupported` error.
    pub fn not_supported(dialect: impl Into<String>, feature: impl Into<String>) -> Self {
        Self::NotSupported {
            dialect: dialect.into(),
            feature: feature.into(),
        }
    }

    /// Creates an `InvalidLookupValue` error.
    pub fn invalid_value(lookup: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidLookupValue {
            lookup: lookup.into(),
            reason: reason.into(),
        }
    }

    /// Wraps any driver-side error.
    pub fn driver<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Driver(Box::new(err))
    }

    /// Returns true for errors raised while resolving lookups.
    #[must_use]
    pub const fn is_lookup_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownLookup { .. } | Self::InvalidLookupValue { .. }
        )
    }
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
