//! Kuuhaku CLI - Command line tool for the Kuuhaku affiliate site.
//!
//! Commands:
//! - `kuuhaku serve` - Run the HTTP service
//! - `kuuhaku rules` - List, edit and test affiliate-link rules
//! - `kuuhaku audit` - Show how the links of an HTML page would be rewritten
//! - `kuuhaku admin` - Admin account helpers
//! - `kuuhaku config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{AdminArgs, AuditArgs, ConfigArgs, RulesArgs, ServeArgs};

/// Kuuhaku CLI - Run and manage the Kuuhaku affiliate site
#[derive(Parser)]
#[command(name = "kuuhaku")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve(ServeArgs),

    /// Manage affiliate-link rules
    Rules(RulesArgs),

    /// Audit the links of an HTML page
    Audit(AuditArgs),

    /// Admin account helpers
    Admin(AdminArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output = output::Output::new(cli.verbose, cli.json);

    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::run(args, &ctx).await,
        Commands::Rules(args) => commands::rules::run(args, &ctx).await,
        Commands::Audit(args) => commands::audit::run(args, &ctx).await,
        Commands::Admin(args) => commands::admin::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
