//! Shared application state.

use std::sync::Arc;

use anyhow::{Context, Result};

use kuuhaku_auth::{AccountDirectory, Authorizer};
use kuuhaku_catalog::prelude::*;
use kuuhaku_db::{Db, SqliteCatalog, SqliteOptionBackend};
use kuuhaku_links::RuleStore;
use kuuhaku_media::{HttpDownloader, ImageResolver, MediaLibrary};
use kuuhaku_options::OptionStore;

use crate::blog::BlogService;
use crate::config::ServiceConfig;
use crate::ingest::IngestService;

/// State handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub ingest: IngestService,
    pub blog: BlogService,
    pub rules: RuleStore,
    pub authorizer: Authorizer,
    /// Lifetime of the session cookie.
    pub session_ttl_secs: i64,
}

impl AppState {
    /// Assemble state from a catalog, an option store and an image resolver.
    pub fn new<C>(
        catalog: Arc<C>,
        options: OptionStore,
        images: ImageResolver,
        config: &ServiceConfig,
    ) -> Self
    where
        C: ProductRepository + PostRepository + 'static,
    {
        let accounts = AccountDirectory::new(config.admins.clone());
        let authorizer = Authorizer::new(accounts, options.clone())
            .with_ttls(config.auth.session_ttl_secs, config.auth.nonce_ttl_secs);

        Self {
            ingest: IngestService::new(catalog.clone(), images),
            blog: BlogService::new(catalog, config.site.url.clone()),
            rules: RuleStore::new(options),
            authorizer,
            session_ttl_secs: config.auth.session_ttl_secs,
        }
    }

    /// Open the configured database and build production state.
    pub async fn open(config: &ServiceConfig) -> Result<Self> {
        let db = Db::connect(&config.database.url)
            .await
            .with_context(|| format!("Failed to open database: {}", config.database.url))?;
        db.migrate().await.context("Failed to migrate database")?;

        let library = MediaLibrary::new(
            &config.media.dir,
            &config.site.url,
            &config.media.public_path,
        );
        let downloader = HttpDownloader::new(config.media.fetch_config())
            .context("Failed to build HTTP client")?;
        let images = ImageResolver::new(library, Arc::new(downloader))
            .with_protected_hosts(config.media.hotlink_protected.clone());

        let catalog = Arc::new(SqliteCatalog::new(db.clone()));
        let options = OptionStore::new(SqliteOptionBackend::new(db));

        if config.admins.is_empty() {
            tracing::warn!("no admin accounts configured; the rule editor is unreachable");
        }

        Ok(Self::new(catalog, options, images, config))
    }
}
