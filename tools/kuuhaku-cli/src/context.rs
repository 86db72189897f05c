//! CLI execution context.

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use kuuhaku_auth::{AccountDirectory, Authorizer};
use kuuhaku_db::{Db, SqliteOptionBackend};
use kuuhaku_links::RuleStore;
use kuuhaku_options::OptionStore;
use kuuhaku_server::ServiceConfig;

use crate::config;
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// Service configuration.
    pub config: ServiceConfig,
    /// Where the configuration came from, if a file was found.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

/// Rule storage opened from the configured database.
pub struct RuleAccess {
    pub rules: RuleStore,
    pub authorizer: Authorizer,
    db: Db,
}

impl RuleAccess {
    pub async fn close(self) {
        self.db.close().await;
    }
}

impl Context {
    /// Load context from an explicit config file or the nearest one found.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config_path = match config_path {
            Some(path) => Some(resolve(&cwd, path)),
            None => config::find(&cwd),
        };

        let config = match &config_path {
            Some(path) => config::load(path)?,
            None => ServiceConfig::default(),
        };

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        resolve(&self.cwd, path)
    }

    /// Open the option store and build the rule store and authorizer on it.
    pub async fn open_rules(&self) -> Result<RuleAccess> {
        let db = Db::connect(&self.config.database.url)
            .await
            .with_context(|| format!("Failed to open database: {}", self.config.database.url))?;
        db.migrate().await.context("Failed to migrate database")?;

        let options = OptionStore::new(SqliteOptionBackend::new(db.clone()));
        let accounts = AccountDirectory::new(self.config.admins.clone());
        let authorizer = Authorizer::new(accounts, options.clone()).with_ttls(
            self.config.auth.session_ttl_secs,
            self.config.auth.nonce_ttl_secs,
        );

        Ok(RuleAccess {
            rules: RuleStore::new(options),
            authorizer,
            db,
        })
    }
}

fn resolve(cwd: &std::path::Path, path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}
