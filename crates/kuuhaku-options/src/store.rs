//! Option store wrapper with automatic serialization.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::OptionsError;

/// Raw storage for named option values.
///
/// Values are JSON text. `set_raw` replaces the whole value in one step, so a
/// reader sees either the old value or the new one.
#[async_trait]
pub trait OptionBackend: Send + Sync {
    /// Get the raw value of an option.
    async fn get_raw(&self, key: &str) -> Result<Option<String>, OptionsError>;

    /// Replace the raw value of an option.
    async fn set_raw(&self, key: &str, value: String) -> Result<(), OptionsError>;

    /// Delete an option. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), OptionsError>;

    /// Keys starting with `prefix`.
    async fn keys(&self, prefix: &str) -> Result<Vec<String>, OptionsError>;
}

/// Type-safe option store.
///
/// Cheap to clone; clones share the backend.
#[derive(Clone)]
pub struct OptionStore {
    backend: Arc<dyn OptionBackend>,
}

impl OptionStore {
    /// Wrap a backend.
    pub fn new(backend: impl OptionBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Wrap an already shared backend.
    pub fn from_arc(backend: Arc<dyn OptionBackend>) -> Self {
        Self { backend }
    }

    /// Get an option.
    ///
    /// Returns `None` if the key doesn't exist.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, OptionsError> {
        match self.backend.get_raw(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Get an option, falling back to `T::default()` when it is unset.
    pub async fn get_or_default<T: DeserializeOwned + Default>(
        &self,
        key: &str,
    ) -> Result<T, OptionsError> {
        Ok(self.get(key).await?.unwrap_or_default())
    }

    /// Set an option, replacing any previous value.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), OptionsError> {
        let raw = serde_json::to_string(value)?;
        self.backend.set_raw(key, raw).await
    }

    /// Delete an option.
    pub async fn delete(&self, key: &str) -> Result<(), OptionsError> {
        self.backend.delete(key).await
    }

    /// Check if an option is set.
    pub async fn exists(&self, key: &str) -> Result<bool, OptionsError> {
        Ok(self.backend.get_raw(key).await?.is_some())
    }

    /// Keys starting with `prefix`.
    pub async fn keys(&self, prefix: &str) -> Result<Vec<String>, OptionsError> {
        self.backend.keys(prefix).await
    }
}

impl std::fmt::Debug for OptionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionStore").finish_non_exhaustive()
    }
}
