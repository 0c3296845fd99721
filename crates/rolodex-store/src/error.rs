use thiserror::Error;

/// Errors raised by contact stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store cannot be built from the given configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The database rejected or failed a query, or no connection could be
    /// acquired in time.
    #[error("Query failed: {0}")]
    Query(#[from] sqlx::Error),
}

impl StoreError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
