//! Product image resolution.
//!
//! Decides the final image URL for an ingested product, in order:
//!
//! 1. inline base64 content, stored in the library;
//! 2. a hotlink-protected host, downloaded with the product page as
//!    `Referer` and re-hosted as `{title}.webp`;
//! 3. any other host, downloaded and re-hosted under its own file name.
//!
//! A failed step falls through to the next. When nothing works the
//! submitted URL is kept. Resolution never fails.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::fetch::{parse_http_url, Downloader};
use crate::library::MediaLibrary;
use crate::names::{extension_for_mime, sanitize_file_name};
use crate::MediaError;

/// File name for inline content submitted without one.
pub const DEFAULT_INLINE_NAME: &str = "kuma-image.webp";

/// Where the final image URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    Uploaded,
    ProtectedDownload,
    RemoteImport,
    Original,
}

impl ImageSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSource::Uploaded => "uploaded",
            ImageSource::ProtectedDownload => "protected_download",
            ImageSource::RemoteImport => "remote_import",
            ImageSource::Original => "original",
        }
    }

    /// Whether the image now lives in the local library.
    pub fn is_local(&self) -> bool {
        !matches!(self, ImageSource::Original)
    }
}

/// Inputs for resolving one product image.
#[derive(Debug, Clone, Default)]
pub struct ImageRequest<'a> {
    pub source_url: &'a str,
    pub product_url: &'a str,
    pub title: &'a str,
    pub image_content: Option<&'a str>,
    pub image_name: Option<&'a str>,
}

/// The resolved image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedImage {
    pub url: String,
    pub source: ImageSource,
}

impl ResolvedImage {
    fn original(url: &str) -> Self {
        Self {
            url: url.to_string(),
            source: ImageSource::Original,
        }
    }
}

/// Resolves product images into the media library.
#[derive(Clone)]
pub struct ImageResolver {
    library: MediaLibrary,
    downloader: Arc<dyn Downloader>,
    protected_hosts: Vec<String>,
}

impl ImageResolver {
    pub fn new(library: MediaLibrary, downloader: Arc<dyn Downloader>) -> Self {
        Self {
            library,
            downloader,
            protected_hosts: Vec::new(),
        }
    }

    /// Set the hotlink-protected hosts.
    pub fn with_protected_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protected_hosts = hosts
            .into_iter()
            .map(|h| h.into().trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        self
    }

    pub fn library(&self) -> &MediaLibrary {
        &self.library
    }

    /// Whether `url` is served by a hotlink-protected host or a subdomain of one.
    pub fn is_protected(&self, url: &str) -> bool {
        let Ok(parsed) = parse_http_url(url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        self.protected_hosts
            .iter()
            .any(|d| host == *d || host.ends_with(&format!(".{}", d)))
    }

    /// Resolve the final image URL.
    pub async fn resolve(&self, request: &ImageRequest<'_>) -> ResolvedImage {
        if let Some(content) = request.image_content.filter(|c| !c.trim().is_empty()) {
            let name = request.image_name.unwrap_or(DEFAULT_INLINE_NAME);
            match self.store_inline(content, name).await {
                Ok(url) => {
                    return ResolvedImage {
                        url,
                        source: ImageSource::Uploaded,
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, name = %name, "inline image rejected, falling back to download")
                }
            }
        }

        if request.source_url.trim().is_empty() {
            return ResolvedImage::original(request.source_url);
        }

        if self.is_protected(request.source_url) {
            match self.download_protected(request).await {
                Ok(url) => {
                    tracing::info!(url = %url, source = ImageSource::ProtectedDownload.as_str(), "image re-hosted");
                    return ResolvedImage {
                        url,
                        source: ImageSource::ProtectedDownload,
                    };
                }
                Err(e) => {
                    tracing::warn!(error = %e, url = %request.source_url, "protected download failed, trying remote import")
                }
            }
        }

        match self.import_remote(request.source_url).await {
            Ok(url) => {
                tracing::info!(url = %url, source = ImageSource::RemoteImport.as_str(), "image re-hosted");
                ResolvedImage {
                    url,
                    source: ImageSource::RemoteImport,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, url = %request.source_url, "image download failed, keeping remote URL");
                ResolvedImage::original(request.source_url)
            }
        }
    }

    async fn store_inline(&self, content: &str, name: &str) -> Result<String, MediaError> {
        let payload = strip_data_uri(content.trim());
        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| MediaError::Decode(e.to_string()))?;
        let stored = self.library.store(name, &bytes).await?;
        Ok(stored.url)
    }

    async fn download_protected(&self, request: &ImageRequest<'_>) -> Result<String, MediaError> {
        let referer = Some(request.product_url).filter(|r| !r.trim().is_empty());
        let downloaded = self.downloader.download(request.source_url, referer).await?;
        let stem = sanitize_file_name(request.title).unwrap_or_else(|| "image".to_string());
        let stored = self
            .library
            .store(&format!("{}.webp", stem), &downloaded.bytes)
            .await?;
        Ok(stored.url)
    }

    async fn import_remote(&self, url: &str) -> Result<String, MediaError> {
        let downloaded = self.downloader.download(url, None).await?;
        let mut name = remote_file_name(url).unwrap_or_else(|| "image".to_string());
        if crate::names::extension(&name).is_none() {
            let ext = downloaded
                .content_type
                .as_deref()
                .and_then(extension_for_mime)
                .unwrap_or("webp");
            name = format!("{}.{}", name, ext);
        }
        let stored = self.library.store(&name, &downloaded.bytes).await?;
        Ok(stored.url)
    }
}

impl std::fmt::Debug for ImageResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageResolver")
            .field("library", &self.library)
            .field("protected_hosts", &self.protected_hosts)
            .finish_non_exhaustive()
    }
}

/// `data:image/png;base64,AAAA` → `AAAA`.
fn strip_data_uri(content: &str) -> &str {
    if content.starts_with("data:") {
        if let Some((_, payload)) = content.split_once(',') {
            return payload;
        }
    }
    content
}

/// Last path segment of a URL, sanitized.
fn remote_file_name(url: &str) -> Option<String> {
    let parsed = parse_http_url(url).ok()?;
    let segment = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
    sanitize_file_name(segment)
}
