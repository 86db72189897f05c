//! Service configuration.
//!
//! Every section is optional in the file and falls back to its defaults.

use serde::{Deserialize, Serialize};

use kuuhaku_auth::{AdminAccount, AuthSession, NonceToken};
use kuuhaku_media::MediaConfig;
use kuuhaku_observability::LoggingConfig;

/// Full service configuration (`kuuhaku.toml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub site: SiteConfig,
    pub server: HttpConfig,
    pub database: DatabaseConfig,
    pub media: MediaConfig,
    pub auth: AuthConfig,
    pub admins: Vec<AdminAccount>,
    pub rewriter: RewriterConfig,
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Check the configuration, collecting every problem found.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.site.name.trim().is_empty() {
            errors.push("site.name cannot be empty".to_string());
        }
        if !(self.site.url.starts_with("http://") || self.site.url.starts_with("https://")) {
            errors.push(format!("site.url must be an http(s) URL, got '{}'", self.site.url));
        }

        if self
            .server
            .listen_addr
            .parse::<std::net::SocketAddr>()
            .is_err()
        {
            errors.push(format!(
                "server.listen_addr is not a socket address: '{}'",
                self.server.listen_addr
            ));
        }
        if self.server.api_keys.iter().any(|k| k.trim().is_empty()) {
            errors.push("server.api_keys cannot contain empty keys".to_string());
        }

        if self.database.url.trim().is_empty() {
            errors.push("database.url cannot be empty".to_string());
        }

        errors.extend(self.media.validate());

        if self.auth.session_ttl_secs <= 0 {
            errors.push("auth.session_ttl_secs must be greater than 0".to_string());
        }
        if self.auth.nonce_ttl_secs <= 0 {
            errors.push("auth.nonce_ttl_secs must be greater than 0".to_string());
        }

        let mut seen = Vec::new();
        for admin in &self.admins {
            if admin.username.trim().is_empty() {
                errors.push("admins: username cannot be empty".to_string());
            } else if seen.contains(&admin.username) {
                errors.push(format!("admins: duplicate username '{}'", admin.username));
            } else {
                seen.push(admin.username.clone());
            }
            if !admin.password_hash.starts_with("$argon2") {
                errors.push(format!(
                    "admins: '{}' needs an argon2 password_hash (see `kuuhaku admin hash-password`)",
                    admin.username
                ));
            }
        }

        if self.rewriter.debounce_ms == 0 {
            errors.push("rewriter.debounce_ms must be greater than 0".to_string());
        }

        errors
    }
}

/// The `[site]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    /// Public base URL, used for permalinks and media URLs.
    pub url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Kuuhaku".to_string(),
            url: "http://localhost:8080".to_string(),
        }
    }
}

/// The `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Listen address (e.g., "0.0.0.0:8080").
    pub listen_addr: String,
    /// Enable CORS for browser-based clients.
    pub cors_enabled: bool,
    /// API keys for the ingestion routes (empty = no auth required).
    pub api_keys: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            cors_enabled: false,
            api_keys: Vec::new(),
        }
    }
}

/// The `[database]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://kuuhaku.db".to_string(),
        }
    }
}

/// The `[auth]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub session_ttl_secs: i64,
    pub nonce_ttl_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: AuthSession::DEFAULT_DURATION_SECS,
            nonce_ttl_secs: NonceToken::DEFAULT_DURATION_SECS,
        }
    }
}

/// The `[rewriter]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriterConfig {
    /// Quiet period before a content change triggers a re-scan.
    pub debounce_ms: u64,
}

impl Default for RewriterConfig {
    fn default() -> Self {
        Self { debounce_ms: 100 }
    }
}

impl RewriterConfig {
    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.debounce_ms)
    }
}
