//! Run the HTTP service.

use anyhow::{bail, Result};

use kuuhaku_observability::{init_logging, LogLevel};
use kuuhaku_server::{ctrl_c, HttpServer};

use super::ServeArgs;
use crate::context::Context;

/// Run the serve command.
pub async fn run(args: ServeArgs, ctx: &Context) -> Result<()> {
    let mut config = ctx.config.clone();
    if let Some(listen) = args.listen {
        config.server.listen_addr = listen;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for error in &errors {
            ctx.output.error(&format!("Error: {}", error));
        }
        bail!("Configuration has {} error(s)", errors.len());
    }

    let mut logging = config.logging.clone();
    if ctx.output.is_verbose() {
        logging = logging.with_level(LogLevel::Debug);
    }
    init_logging(&logging)?;

    match &ctx.config_path {
        Some(path) => ctx.output.debug(&format!("Config: {}", path.display())),
        None => ctx.output.warn("No config file found, using defaults"),
    }

    ctx.output
        .info(&format!("Serving {} on http://{}", config.site.name, config.server.listen_addr));

    HttpServer::from_config(config).await?.run(ctrl_c()).await
}
