//! HTTP server.

use std::future::Future;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServiceConfig;
use crate::routes::create_router;
use crate::state::AppState;

/// The Kuuhaku HTTP service.
pub struct HttpServer {
    config: ServiceConfig,
    state: AppState,
}

impl HttpServer {
    pub fn new(config: ServiceConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Open storage from the config and build the server.
    pub async fn from_config(config: ServiceConfig) -> Result<Self> {
        let state = AppState::open(&config).await?;
        Ok(Self::new(config, state))
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = self
            .config
            .server
            .listen_addr
            .parse()
            .context("Invalid HTTP listen address")?;

        tokio::fs::create_dir_all(&self.config.media.dir)
            .await
            .with_context(|| {
                format!(
                    "Failed to create media directory: {}",
                    self.config.media.dir.display()
                )
            })?;

        let app = create_router(self.state, &self.config);

        let listener = TcpListener::bind(&addr)
            .await
            .context("Failed to bind HTTP server")?;

        info!(
            site = %self.config.site.name,
            "HTTP server listening on http://{}",
            addr
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("HTTP server shutting down");
            })
            .await
            .context("HTTP server error")?;

        Ok(())
    }
}

/// Resolves on Ctrl-C.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
