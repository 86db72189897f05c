//! Admin account helpers.

use anyhow::Result;
use dialoguer::Password;

use kuuhaku_auth::hash_password;

use super::{AdminArgs, AdminCommand};
use crate::context::Context;

/// Run the admin command.
pub async fn run(args: AdminArgs, ctx: &Context) -> Result<()> {
    match args.command {
        AdminCommand::HashPassword => hash(ctx),
        AdminCommand::List => list(ctx),
    }
}

fn hash(ctx: &Context) -> Result<()> {
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()?;

    let spinner = ctx.output.spinner("Hashing");
    let hash = hash_password(&password);
    spinner.finish_and_clear();
    let hash = hash?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "password_hash": hash }));
    } else {
        ctx.output.success("Add this to an [[admins]] entry:");
        println!("password_hash = \"{}\"", hash);
    }
    Ok(())
}

fn list(ctx: &Context) -> Result<()> {
    let admins = &ctx.config.admins;

    if ctx.output.is_json() {
        let names: Vec<_> = admins
            .iter()
            .map(|a| serde_json::json!({ "username": a.username, "role": a.role }))
            .collect();
        ctx.output.json(&names);
        return Ok(());
    }

    if admins.is_empty() {
        ctx.output.info("No admin accounts configured.");
        return Ok(());
    }

    ctx.output.header("Admin accounts");
    for admin in admins {
        ctx.output
            .list_item(&format!("{} ({})", admin.username, admin.role.as_str()));
    }
    Ok(())
}
