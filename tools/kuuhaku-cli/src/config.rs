//! Config file loading and the `config init` template.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use kuuhaku_server::ServiceConfig;

/// File names searched for, in order, in each directory.
pub const CONFIG_NAMES: [&str; 3] = ["kuuhaku.toml", ".kuuhaku.toml", "kuuhaku.json"];

/// Load a config file; `.json` files are read as JSON, anything else as TOML.
pub fn load(path: &Path) -> Result<ServiceConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    if is_json(path) {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
    } else {
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
    }
}

/// Save a config file in the format its extension names.
pub fn save(config: &ServiceConfig, path: &Path) -> Result<()> {
    let content = if is_json(path) {
        serde_json::to_string_pretty(config)?
    } else {
        toml::to_string_pretty(config)?
    };

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))
}

/// Find a config file in `start` or one of its parents.
pub fn find(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in CONFIG_NAMES {
            let candidate = current.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        if !current.pop() {
            return None;
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "json")
}

/// Generate a commented `kuuhaku.toml`.
pub fn generate_default_config(site_name: &str) -> String {
    format!(
        r#"# Kuuhaku affiliate site configuration

[site]
name = "{site_name}"
url = "http://localhost:8080"

[server]
listen_addr = "127.0.0.1:8080"
cors_enabled = false
# Scraper API keys. Leave empty to accept unauthenticated requests.
api_keys = []

[database]
url = "sqlite://kuuhaku.db"

[media]
dir = "uploads"
public_path = "/uploads"
hotlink_protected = ["kuma-doll.com"]
timeout_secs = 30
max_bytes = 10485760
max_retries = 2

[auth]
session_ttl_secs = 172800
nonce_ttl_secs = 86400

# Generate a hash with `kuuhaku admin hash-password`.
# [[admins]]
# username = "admin"
# password_hash = "$argon2id$..."
# role = "administrator"

[rewriter]
debounce_ms = 100

[logging]
level = "info"
format = "text"
"#,
        site_name = site_name
    )
}
