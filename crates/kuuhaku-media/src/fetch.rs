//! HTTP image downloads.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::retry::RetryPolicy;
use crate::MediaError;

/// A downloaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downloaded {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    /// URL after redirects.
    pub final_url: String,
}

/// Something that can fetch an image by URL.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Fetch `url`, sending `referer` when given.
    async fn download(&self, url: &str, referer: Option<&str>) -> Result<Downloaded, MediaError>;
}

/// Configuration for the HTTP downloader.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    /// Whole-request timeout.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Maximum body size in bytes.
    pub max_bytes: usize,
    pub max_redirects: usize,
    pub retry: RetryPolicy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("kuuhaku-media/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_bytes: 10 * 1024 * 1024,
            max_redirects: 5,
            retry: RetryPolicy::default(),
        }
    }
}

/// Downloader backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: reqwest::Client,
    config: FetchConfig,
}

impl HttpDownloader {
    pub fn new(config: FetchConfig) -> Result<Self, MediaError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client, config })
    }

    async fn fetch_once(&self, url: &Url, referer: Option<&str>) -> Result<Downloaded, MediaError> {
        let mut request = self.client.get(url.as_str());
        if let Some(referer) = referer {
            request = request.header(reqwest::header::REFERER, referer);
        }
        let mut response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        if let Some(len) = response.content_length() {
            if len > self.config.max_bytes as u64 {
                return Err(MediaError::TooLarge(self.config.max_bytes));
            }
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let final_url = response.url().to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if bytes.len() + chunk.len() > self.config.max_bytes {
                return Err(MediaError::TooLarge(self.config.max_bytes));
            }
            bytes.extend_from_slice(&chunk);
        }
        if bytes.is_empty() {
            return Err(MediaError::Empty);
        }

        Ok(Downloaded {
            bytes,
            content_type,
            final_url,
        })
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &str, referer: Option<&str>) -> Result<Downloaded, MediaError> {
        let parsed = parse_http_url(url)?;
        let mut attempt = 0u32;
        loop {
            match self.fetch_once(&parsed, referer).await {
                Ok(downloaded) => return Ok(downloaded),
                Err(e) if self.config.retry.should_retry(&e, attempt) => {
                    let delay = self.config.retry.backoff.delay_for_attempt(attempt);
                    tracing::debug!(url = %url, attempt, error = %e, ?delay, "retrying download");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Parse an absolute http(s) URL.
pub fn parse_http_url(url: &str) -> Result<Url, MediaError> {
    let parsed = Url::parse(url.trim()).map_err(|e| MediaError::InvalidUrl(format!("{}: {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(MediaError::InvalidUrl(format!("unsupported scheme {}", other))),
    }
}
