//! In-memory option backend for development and tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{OptionBackend, OptionsError};

/// Options held in a process-local map.
#[derive(Debug, Default)]
pub struct MemoryOptionBackend {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemoryOptionBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OptionBackend for MemoryOptionBackend {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, OptionsError> {
        Ok(self.values.read().get(key).cloned())
    }

    async fn set_raw(&self, key: &str, value: String) -> Result<(), OptionsError> {
        self.values.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), OptionsError> {
        self.values.write().remove(key);
        Ok(())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, OptionsError> {
        Ok(self
            .values
            .read()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_keys_by_prefix() {
        let backend = MemoryOptionBackend::new();
        backend.set_raw("session:a", "1".into()).await.unwrap();
        backend.set_raw("session:b", "2".into()).await.unwrap();
        backend.set_raw("nonce:x", "3".into()).await.unwrap();

        let keys = backend.keys("session:").await.unwrap();
        assert_eq!(keys, vec!["session:a".to_string(), "session:b".to_string()]);
    }
}
