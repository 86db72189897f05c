//! Option storage error types.

use thiserror::Error;

/// Errors that can occur when reading or writing options.
#[derive(Error, Debug)]
pub enum OptionsError {
    /// Failed to open the backing store.
    #[error("Failed to open option store: {0}")]
    OpenError(String),

    /// Stored value could not be (de)serialized.
    #[error("Serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// Backend operation failed.
    #[error("Option store operation failed: {0}")]
    StoreError(String),
}
