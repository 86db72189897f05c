//! Media configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::fetch::FetchConfig;
use crate::retry::RetryPolicy;

/// The `[media]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Directory uploaded and re-hosted images are written to.
    pub dir: PathBuf,
    /// URL path the directory is served under.
    pub public_path: String,
    /// Image hosts that reject requests without a matching `Referer`.
    pub hotlink_protected: Vec<String>,
    pub timeout_secs: u64,
    pub max_bytes: usize,
    pub user_agent: String,
    pub max_retries: u32,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
            public_path: "/uploads".to_string(),
            hotlink_protected: vec!["kuma-doll.com".to_string()],
            timeout_secs: 30,
            max_bytes: 10 * 1024 * 1024,
            user_agent: "Mozilla/5.0 (compatible; KuuhakuBot/1.0)".to_string(),
            max_retries: 2,
        }
    }
}

impl MediaConfig {
    /// Downloader settings derived from this section.
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            max_bytes: self.max_bytes,
            retry: RetryPolicy::new(self.max_retries),
            ..FetchConfig::default()
        }
    }

    /// Validation errors, empty when the section is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.dir.as_os_str().is_empty() {
            errors.push("media.dir cannot be empty".to_string());
        }
        if !self.public_path.starts_with('/') {
            errors.push("media.public_path must start with '/'".to_string());
        } else if self.public_path.trim_matches('/').is_empty() {
            errors.push("media.public_path cannot be the site root".to_string());
        }
        if self.timeout_secs == 0 {
            errors.push("media.timeout_secs must be greater than 0".to_string());
        }
        if self.max_bytes == 0 {
            errors.push("media.max_bytes must be greater than 0".to_string());
        }
        errors
    }
}
