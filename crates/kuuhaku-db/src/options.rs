//! Option table backend.

use async_trait::async_trait;
use kuuhaku_options::{OptionBackend, OptionsError};

use crate::{Db, DbError};

/// Options stored as rows of the `options` table.
#[derive(Debug, Clone)]
pub struct SqliteOptionBackend {
    db: Db,
}

impl SqliteOptionBackend {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OptionBackend for SqliteOptionBackend {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, OptionsError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM options WHERE name = ?")
            .bind(key)
            .fetch_optional(self.db.pool())
            .await
            .map_err(DbError::from)?;
        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: String) -> Result<(), OptionsError> {
        sqlx::query(
            "INSERT INTO options (name, value) VALUES (?, ?) \
             ON CONFLICT(name) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(self.db.pool())
        .await
        .map_err(DbError::from)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), OptionsError> {
        sqlx::query("DELETE FROM options WHERE name = ?")
            .bind(key)
            .execute(self.db.pool())
            .await
            .map_err(DbError::from)?;
        Ok(())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, OptionsError> {
        let pattern = format!("{}%", escape_like(prefix));
        let keys = sqlx::query_scalar::<_, String>(
            "SELECT name FROM options WHERE name LIKE ? ESCAPE '\\' ORDER BY name",
        )
        .bind(pattern)
        .fetch_all(self.db.pool())
        .await
        .map_err(DbError::from)?;
        Ok(keys)
    }
}

fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuuhaku_options::OptionStore;

    async fn store() -> OptionStore {
        let db = Db::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        OptionStore::new(SqliteOptionBackend::new(db))
    }

    #[tokio::test]
    async fn test_set_replaces_value() {
        let store = store().await;
        store.set("lovedoll_affiliate_links", &vec!["a"]).await.unwrap();
        store.set("lovedoll_affiliate_links", &vec!["b", "c"]).await.unwrap();

        let value: Vec<String> = store.get_or_default("lovedoll_affiliate_links").await.unwrap();
        assert_eq!(value, vec!["b".to_string(), "c".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let store = store().await;
        store.delete("nope").await.unwrap();
        assert!(!store.exists("nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_keys_prefix_is_literal() {
        let store = store().await;
        store.set("nonce:save_affiliate_links:x", &1).await.unwrap();
        store.set("nonce:saveXaffiliate_links:y", &1).await.unwrap();
        store.set("session:abc", &1).await.unwrap();

        let keys = store.keys("nonce:save_").await.unwrap();
        assert_eq!(keys, vec!["nonce:save_affiliate_links:x".to_string()]);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("a_b%c"), "a\\_b\\%c");
    }
}
