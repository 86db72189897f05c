//! HTTP service for the Kuuhaku affiliate site.
//!
//! Routes:
//! - `/wp-json/lovedoll/v1/add-item`, `/list` - product ingestion for the scrapers
//! - `/wp-json/lovedoll/v1/create-blog-post`, `/blog-posts` - generated posts
//! - `/admin/*` - login and the affiliate-link editor
//! - `/affiliate-settings.js` - enabled rules for the page-side rewriter
//! - `/uploads/*` - the media library
//!
//! # Example
//!
//! ```rust,ignore
//! let config: ServiceConfig = toml::from_str(&text)?;
//! HttpServer::from_config(config).await?.run(ctrl_c()).await?;
//! ```

pub mod blog;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod ingest;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServiceConfig;
pub use error::{ApiError, ErrorResponse};
pub use routes::{create_router, API_PREFIX};
pub use server::{ctrl_c, HttpServer};
pub use state::AppState;
