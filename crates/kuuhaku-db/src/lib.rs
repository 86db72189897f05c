//! SQLite storage for the Kuuhaku affiliate site.
//!
//! One database holds products, generated posts and the option table. The
//! repositories here implement the storage traits from `kuuhaku-catalog` and
//! `kuuhaku-options`.
//!
//! # Example
//!
//! ```rust,ignore
//! use kuuhaku_db::{Db, SqliteCatalog, SqliteOptionBackend};
//!
//! let db = Db::connect("sqlite://kuuhaku.db").await?;
//! db.migrate().await?;
//!
//! let catalog = SqliteCatalog::new(db.clone());
//! let options = OptionStore::new(SqliteOptionBackend::new(db));
//! ```

mod catalog;
mod db;
mod error;
mod options;

pub use catalog::SqliteCatalog;
pub use db::Db;
pub use error::DbError;
pub use options::SqliteOptionBackend;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Db, DbError, SqliteCatalog, SqliteOptionBackend};
}

/// Get current Unix timestamp.
pub(crate) fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
