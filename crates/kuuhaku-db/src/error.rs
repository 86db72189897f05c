//! Database error types.

use kuuhaku_catalog::CatalogError;
use kuuhaku_options::OptionsError;
use thiserror::Error;

/// Errors that can occur when using the database.
#[derive(Error, Debug)]
pub enum DbError {
    /// Failed to open the database.
    #[error("Failed to open database: {0}")]
    OpenError(String),

    /// Failed to create or update the schema.
    #[error("Migration failed: {0}")]
    MigrationError(String),

    /// Failed to execute a query.
    #[error("Query execution failed: {0}")]
    QueryError(#[from] sqlx::Error),

    /// Failed to decode a stored JSON column.
    #[error("Deserialization error: {0}")]
    DeserializeError(String),
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        DbError::DeserializeError(e.to_string())
    }
}

impl From<DbError> for CatalogError {
    fn from(e: DbError) -> Self {
        CatalogError::StorageError(e.to_string())
    }
}

impl From<DbError> for OptionsError {
    fn from(e: DbError) -> Self {
        OptionsError::StoreError(e.to_string())
    }
}
