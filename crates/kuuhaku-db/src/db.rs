//! Connection pool and schema.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::DbError;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS products (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        product_url TEXT NOT NULL UNIQUE,
        price INTEGER NOT NULL,
        source_image_url TEXT NOT NULL,
        image_url TEXT NOT NULL,
        created_at INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS posts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        excerpt TEXT,
        status TEXT NOT NULL,
        tags TEXT NOT NULL DEFAULT '[]',
        categories TEXT NOT NULL DEFAULT '[]',
        meta_description TEXT,
        target_keyword TEXT,
        auto_generated INTEGER NOT NULL DEFAULT 0,
        generated_at INTEGER,
        created_at INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS posts_generated ON posts (auto_generated, id)",
    "CREATE TABLE IF NOT EXISTS options (
        name TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )",
];

/// SQLite database handle.
///
/// Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Open a database by URL, creating the file if needed.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let db = Db::connect("sqlite://data/kuuhaku.db").await?;
    /// ```
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        if is_memory_url(url) {
            return Self::in_memory().await;
        }
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| DbError::OpenError(e.to_string()))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await
            .map_err(|e| DbError::OpenError(e.to_string()))?;
        tracing::debug!(url = %url, "opened database");
        Ok(Self { pool })
    }

    /// Open a private in-memory database.
    ///
    /// The pool holds a single connection that never expires, since every
    /// SQLite memory connection is its own database.
    pub async fn in_memory() -> Result<Self, DbError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DbError::OpenError(e.to_string()))?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| DbError::OpenError(e.to_string()))?;
        Ok(Self { pool })
    }

    /// Create missing tables and indexes.
    pub async fn migrate(&self) -> Result<(), DbError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| DbError::MigrationError(e.to_string()))?;
        }
        Ok(())
    }

    /// The underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close all connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn is_memory_url(url: &str) -> bool {
    matches!(url.trim(), "sqlite::memory:" | ":memory:" | "sqlite://:memory:")
}
