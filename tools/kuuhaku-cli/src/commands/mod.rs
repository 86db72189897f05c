//! CLI command implementations.

pub mod admin;
pub mod audit;
pub mod config;
pub mod rules;
pub mod serve;

use clap::{Args, Subcommand};

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Override `server.listen_addr`.
    #[arg(short, long)]
    pub listen: Option<String>,
}

/// Arguments for the rules command.
#[derive(Args)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub command: Option<RulesCommand>,

    /// Admin user for commands that save (default: the only configured admin).
    #[arg(short, long, global = true)]
    pub user: Option<String>,
}

#[derive(Subcommand)]
pub enum RulesCommand {
    /// List the saved rules.
    List,
    /// Append a rule and save.
    Add {
        /// Domain matched against link URLs (substring).
        domain: String,
        /// Query parameters to add, e.g. `?ref=kuuhaku`.
        param: String,
        /// Display name.
        #[arg(short, long, default_value = "")]
        name: String,
        /// Save the rule disabled.
        #[arg(long)]
        disabled: bool,
    },
    /// Change fields of a rule and save.
    Edit {
        /// Row number as shown by `rules list`.
        row: usize,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        domain: Option<String>,
        #[arg(long)]
        param: Option<String>,
    },
    /// Flip a rule between enabled and disabled and save.
    Toggle {
        /// Row number as shown by `rules list`.
        row: usize,
    },
    /// Delete a rule and save.
    Remove {
        /// Row number as shown by `rules list`.
        row: usize,
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the example URL each rule produces.
    Preview,
    /// Convert a URL with the saved rules.
    Test {
        /// URL to convert.
        url: String,
    },
}

/// Arguments for the audit command.
#[derive(Args)]
pub struct AuditArgs {
    /// HTML file to audit.
    pub file: String,

    /// Show links that no rule touches.
    #[arg(short, long)]
    pub all: bool,

    /// Re-scan whenever the file changes.
    #[arg(short, long)]
    pub watch: bool,

    /// Polling interval for --watch, in milliseconds.
    #[arg(long, default_value = "500")]
    pub interval_ms: u64,

    /// Write the rewritten page to this file.
    #[arg(short = 'o', long, value_name = "OUT")]
    pub write: Option<String>,
}

/// Arguments for the admin command.
#[derive(Args)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub command: AdminCommand,
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Hash a password for an `[[admins]]` entry.
    HashPassword,
    /// List configured admin accounts.
    List,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
