//! Catalog error types.

use thiserror::Error;

/// Errors that can occur in catalog operations.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A required submission field is missing or unusable.
    #[error("{0}")]
    InvalidParams(String),

    /// Normalized price is at or above the accepted ceiling.
    #[error("Price is 1,000,000 or higher; skipped. (got {0})")]
    PriceTooHigh(i64),

    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Post not found.
    #[error("Post not found: {0}")]
    PostNotFound(String),

    /// Storage backend error.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CatalogError {
    /// Stable machine-readable code, used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            CatalogError::InvalidParams(_) => "invalid_params",
            CatalogError::PriceTooHigh(_) => "price_too_high",
            CatalogError::ProductNotFound(_) | CatalogError::PostNotFound(_) => "not_found",
            CatalogError::StorageError(_) => "storage_error",
            CatalogError::SerializationError(_) => "serialization_error",
        }
    }

    /// Whether the caller sent something we refuse to store.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CatalogError::InvalidParams(_) | CatalogError::PriceTooHigh(_)
        )
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::SerializationError(e.to_string())
    }
}
