//! On-disk media library.
//!
//! Files land in `{dir}/{YYYY}/{MM}/` and are served from
//! `{site_url}{public_path}/{YYYY}/{MM}/`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::names::{mime_for, sanitize_file_name, with_default_extension};
use crate::MediaError;

/// A stored media file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMedia {
    /// Final file name, including any collision suffix.
    pub file_name: String,
    pub path: PathBuf,
    /// Public URL.
    pub url: String,
    pub mime: String,
    pub size: usize,
}

/// Media storage rooted at a directory.
#[derive(Debug, Clone)]
pub struct MediaLibrary {
    dir: PathBuf,
    public_base: String,
}

impl MediaLibrary {
    /// `site_url` and `public_path` are joined to form the public URL prefix.
    pub fn new(dir: impl Into<PathBuf>, site_url: &str, public_path: &str) -> Self {
        let public_path = public_path.trim_matches('/');
        let public_base = if public_path.is_empty() {
            site_url.trim_end_matches('/').to_string()
        } else {
            format!("{}/{}", site_url.trim_end_matches('/'), public_path)
        };
        Self {
            dir: dir.into(),
            public_base,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store bytes under the current year and month.
    pub async fn store(&self, file_name: &str, bytes: &[u8]) -> Result<StoredMedia, MediaError> {
        let now = Utc::now();
        self.store_in(now.year(), now.month(), file_name, bytes).await
    }

    /// Store bytes under an explicit year and month.
    ///
    /// An existing file is never overwritten; `-1`, `-2`, ... is appended to
    /// the stem until a free name is found.
    pub async fn store_in(
        &self,
        year: i32,
        month: u32,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<StoredMedia, MediaError> {
        if bytes.is_empty() {
            return Err(MediaError::Empty);
        }
        let clean = sanitize_file_name(file_name).unwrap_or_else(|| "image".to_string());
        let clean = with_default_extension(&clean, "webp");

        let subdir = format!("{:04}/{:02}", year, month);
        let dir = self.dir.join(&subdir);
        tokio::fs::create_dir_all(&dir).await?;

        let mut attempt = 0u32;
        loop {
            let candidate = suffixed(&clean, attempt);
            let path = dir.join(&candidate);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(bytes).await?;
                    file.flush().await?;
                    tracing::debug!(path = %path.display(), size = bytes.len(), "stored media");
                    return Ok(StoredMedia {
                        url: format!("{}/{}/{}", self.public_base, subdir, candidate),
                        mime: mime_for(&candidate).to_string(),
                        file_name: candidate,
                        path,
                        size: bytes.len(),
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

fn suffixed(name: &str, attempt: u32) -> String {
    if attempt == 0 {
        return name.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}-{}.{}", stem, attempt, ext),
        _ => format!("{}-{}", name, attempt),
    }
}
