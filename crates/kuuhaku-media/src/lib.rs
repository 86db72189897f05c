//! Media handling for the Kuuhaku affiliate site.
//!
//! Product images are moved into a local media library when possible:
//! inline uploads are decoded and stored, remote images are downloaded
//! (with a `Referer` for hotlink-protected hosts) and re-hosted.
//!
//! ```rust,ignore
//! use kuuhaku_media::prelude::*;
//!
//! let library = MediaLibrary::new(&config.dir, &site_url, &config.public_path);
//! let downloader = Arc::new(HttpDownloader::new(config.fetch_config())?);
//! let resolver = ImageResolver::new(library, downloader)
//!     .with_protected_hosts(config.hotlink_protected.clone());
//!
//! let image = resolver.resolve(&request).await;
//! ```

mod config;
mod error;
mod fetch;
mod library;
mod names;
mod resolver;
mod retry;

pub use config::MediaConfig;
pub use error::MediaError;
pub use fetch::{parse_http_url, Downloaded, Downloader, FetchConfig, HttpDownloader};
pub use library::{MediaLibrary, StoredMedia};
pub use names::{extension, extension_for_mime, mime_for, sanitize_file_name, with_default_extension};
pub use resolver::{ImageRequest, ImageResolver, ImageSource, ResolvedImage, DEFAULT_INLINE_NAME};
pub use retry::{BackoffStrategy, RetryPolicy};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        Downloader, HttpDownloader, ImageRequest, ImageResolver, ImageSource, MediaConfig,
        MediaError, MediaLibrary, ResolvedImage,
    };
}
