//! Configuration management commands.

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = &ctx.config;

    if ctx.output.is_json() {
        ctx.output.json(config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    ctx.output.info("");
    ctx.output.info("[site]");
    ctx.output.kv("name", &config.site.name);
    ctx.output.kv("url", &config.site.url);

    ctx.output.info("");
    ctx.output.info("[server]");
    ctx.output.kv("listen_addr", &config.server.listen_addr);
    ctx.output
        .kv("cors_enabled", &config.server.cors_enabled.to_string());
    ctx.output
        .kv("api_keys", &format!("{} configured", config.server.api_keys.len()));

    ctx.output.info("");
    ctx.output.info("[database]");
    ctx.output.kv("url", &config.database.url);

    ctx.output.info("");
    ctx.output.info("[media]");
    ctx.output.kv("dir", &config.media.dir.display().to_string());
    ctx.output.kv("public_path", &config.media.public_path);
    ctx.output
        .kv("hotlink_protected", &config.media.hotlink_protected.join(", "));
    ctx.output
        .kv("timeout_secs", &config.media.timeout_secs.to_string());

    ctx.output.info("");
    ctx.output.info("[auth]");
    ctx.output
        .kv("session_ttl_secs", &config.auth.session_ttl_secs.to_string());
    ctx.output
        .kv("nonce_ttl_secs", &config.auth.nonce_ttl_secs.to_string());

    ctx.output.info("");
    ctx.output.info("[rewriter]");
    ctx.output
        .kv("debounce_ms", &config.rewriter.debounce_ms.to_string());

    ctx.output.info("");
    ctx.output.info("[logging]");
    ctx.output.kv("level", config.logging.level.as_str());

    if !config.admins.is_empty() {
        ctx.output.info("");
        ctx.output.info("Admins:");
        for admin in &config.admins {
            ctx.output.list_item(&admin.username);
        }
    }

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("kuuhaku.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, generate_default_config("Kuuhaku"))?;
    ctx.output
        .success(&format!("Created: {}", config_path.display()));
    ctx.output
        .info("Add an admin with `kuuhaku admin hash-password`.");

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let errors = ctx.config.validate();
    let mut warnings: Vec<String> = Vec::new();

    if ctx.config_path.is_none() {
        warnings.push("no config file found, checking defaults".to_string());
    }
    if ctx.config.admins.is_empty() {
        warnings.push("no [[admins]] configured; the rule editor cannot be used".to_string());
    }
    if ctx.config.server.api_keys.is_empty() {
        warnings.push("server.api_keys is empty; the ingestion API is open".to_string());
    }

    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output
        .success("Configuration is valid (with warnings)");

    Ok(())
}
