//! Affiliate-link rule commands.
//!
//! Rows are numbered from 1 as in `rules list`. Every mutating command
//! loads the saved list into an editor, applies one change and saves the
//! whole list back through the same authorized path the admin page uses.

use anyhow::{bail, Context as _, Result};
use dialoguer::{Confirm, Password};

use kuuhaku_auth::{AdminAccount, Authorizer, Capability};
use kuuhaku_links::{AffiliateRule, RuleEdit, RuleEditor, RuleStore, SAVE_ACTION};

use super::{RulesArgs, RulesCommand};
use crate::context::{Context, RuleAccess};
use crate::output::{enabled_badge, truncate};

/// Run the rules command.
pub async fn run(args: RulesArgs, ctx: &Context) -> Result<()> {
    let access = ctx.open_rules().await?;
    let result = dispatch(args, ctx, &access).await;
    access.close().await;
    result
}

async fn dispatch(args: RulesArgs, ctx: &Context, access: &RuleAccess) -> Result<()> {
    let user = args.user;
    match args.command.unwrap_or(RulesCommand::List) {
        RulesCommand::List => list_rules(ctx, access).await,
        RulesCommand::Preview => preview_rules(ctx, access).await,
        RulesCommand::Test { url } => test_rule(&url, ctx, access).await,
        RulesCommand::Add {
            domain,
            param,
            name,
            disabled,
        } => {
            let mut editor = load_editor(access).await?;
            let rule = AffiliateRule::new(name, domain, param).with_enabled(!disabled);
            if !rule.is_complete() {
                bail!("Both a domain and a param are required");
            }
            let row = editor.push(rule) + 1;
            save(editor, user.as_deref(), ctx, access).await?;
            ctx.output.success(&format!("Added rule #{}", row));
            Ok(())
        }
        RulesCommand::Edit {
            row,
            name,
            domain,
            param,
        } => {
            let edit = RuleEdit {
                name,
                domain,
                param,
                enabled: None,
            };
            if edit == RuleEdit::default() {
                bail!("Nothing to change; pass --name, --domain or --param");
            }
            let mut editor = load_editor(access).await?;
            editor.edit(row_index(row)?, edit)?;
            save(editor, user.as_deref(), ctx, access).await?;
            ctx.output.success(&format!("Updated rule #{}", row));
            Ok(())
        }
        RulesCommand::Toggle { row } => {
            let mut editor = load_editor(access).await?;
            let enabled = editor.toggle(row_index(row)?)?;
            save(editor, user.as_deref(), ctx, access).await?;
            ctx.output
                .success(&format!("Rule #{} is now {}", row, enabled_badge(enabled)));
            Ok(())
        }
        RulesCommand::Remove { row, yes } => {
            let mut editor = load_editor(access).await?;
            let confirm = |prompt: &str| -> bool {
                yes || Confirm::new()
                    .with_prompt(prompt)
                    .default(false)
                    .interact()
                    .unwrap_or(false)
            };
            let Some(removed) = editor.delete(row_index(row)?, &confirm)? else {
                ctx.output.warn("Cancelled");
                return Ok(());
            };
            save(editor, user.as_deref(), ctx, access).await?;
            ctx.output
                .success(&format!("Removed rule #{} ({})", row, removed.domain));
            Ok(())
        }
    }
}

async fn list_rules(ctx: &Context, access: &RuleAccess) -> Result<()> {
    let editor = load_editor(access).await?;

    if ctx.output.is_json() {
        ctx.output.json(&editor.rules());
        return Ok(());
    }

    ctx.output.header("Affiliate links");
    if editor.is_empty() {
        ctx.output.info("No rules saved.");
        ctx.output
            .info("Run `kuuhaku rules add <domain> <param>` to add one.");
        return Ok(());
    }

    const WIDTHS: [usize; 5] = [4, 20, 24, 30, 8];
    ctx.output
        .table_row(&["#", "NAME", "DOMAIN", "PARAM", "STATUS"], &WIDTHS);
    for (i, rule) in editor.rules().iter().enumerate() {
        let row = (i + 1).to_string();
        let badge = enabled_badge(rule.enabled);
        ctx.output.table_row(
            &[
                &row,
                &truncate(&rule.name, 20),
                &truncate(&rule.domain, 24),
                &truncate(&rule.param, 30),
                &badge,
            ],
            &WIDTHS,
        );
    }

    let stats = editor.stats();
    ctx.output.info("");
    ctx.output
        .info(&format!("Total: {} rule(s), {} enabled", stats.total, stats.active));
    Ok(())
}

async fn preview_rules(ctx: &Context, access: &RuleAccess) -> Result<()> {
    let editor = load_editor(access).await?;
    let previews = editor.previews();

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "previews": previews,
            "stats": editor.stats(),
        }));
        return Ok(());
    }

    ctx.output.header("Preview");
    for (i, (rule, preview)) in editor.rules().iter().zip(&previews).enumerate() {
        ctx.output
            .list_item(&format!("#{} {}: {}", i + 1, rule.label(), preview));
    }
    Ok(())
}

async fn test_rule(url: &str, ctx: &Context, access: &RuleAccess) -> Result<()> {
    let editor = load_editor(access).await?;
    let result = editor.test_convert(url)?;

    if ctx.output.is_json() {
        ctx.output.json(&result);
        return Ok(());
    }

    ctx.output.kv("original", &result.original);
    ctx.output.kv("converted", &result.converted);
    if result.matched {
        ctx.output
            .success(&format!("Matched: {}", result.matched_rules.join(", ")));
    } else {
        ctx.output.warn("No rule matched");
    }
    Ok(())
}

async fn load_editor(access: &RuleAccess) -> Result<RuleEditor> {
    let rules = access
        .rules
        .load()
        .await
        .context("Failed to load affiliate links")?;
    Ok(RuleEditor::new(rules))
}

/// Convert a 1-based row number to an index.
fn row_index(row: usize) -> Result<usize> {
    match row.checked_sub(1) {
        Some(index) => Ok(index),
        None => bail!("Rows are numbered from 1"),
    }
}

/// Pick the admin to save as: `--user`, else the only configured admin.
fn choose_user<'a>(admins: &'a [AdminAccount], requested: Option<&'a str>) -> Result<&'a str> {
    if let Some(user) = requested {
        return Ok(user);
    }
    match admins {
        [] => bail!("No [[admins]] configured; add one with a hash from `kuuhaku admin hash-password`"),
        [only] => Ok(&only.username),
        _ => bail!("Several admins are configured; choose one with --user"),
    }
}

async fn save(
    editor: RuleEditor,
    user: Option<&str>,
    ctx: &Context,
    access: &RuleAccess,
) -> Result<()> {
    let username = choose_user(&ctx.config.admins, user)?;
    let password = Password::new()
        .with_prompt(format!("Password for {}", username))
        .interact()?;

    let saved = save_as(
        &access.authorizer,
        &access.rules,
        username,
        &password,
        editor.rules(),
    )
    .await?;
    ctx.output.debug(&format!("Saved {} rule(s)", saved.len()));
    Ok(())
}

/// Log in, obtain a save nonce, authorize and replace the stored list.
async fn save_as(
    authorizer: &Authorizer,
    store: &RuleStore,
    username: &str,
    password: &str,
    rules: &[AffiliateRule],
) -> Result<Vec<AffiliateRule>> {
    let session = authorizer.login(username, password).await?;
    let nonce = authorizer.issue_nonce(SAVE_ACTION, &session.id).await?;
    let grant = authorizer
        .authorize(
            Some(&session.id),
            SAVE_ACTION,
            Some(&nonce.value),
            Capability::ManageOptions,
        )
        .await;
    let saved: Result<Vec<AffiliateRule>> = match grant {
        Ok(grant) => store.replace_all(&grant, rules).await.map_err(Into::into),
        Err(e) => Err(e.into()),
    };
    authorizer.logout(&session.id).await?;
    saved
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuuhaku_auth::{hash_password, AccountDirectory, AuthError, Role};
    use kuuhaku_options::{MemoryOptionBackend, OptionStore};

    fn setup() -> (Authorizer, RuleStore) {
        let options = OptionStore::new(MemoryOptionBackend::new());
        let accounts = AccountDirectory::new(vec![
            AdminAccount::new("kuma", hash_password("pass1234").unwrap(), Role::Administrator),
            AdminAccount::new("writer", hash_password("pass1234").unwrap(), Role::Editor),
        ]);
        (
            Authorizer::new(accounts, options.clone()),
            RuleStore::new(options),
        )
    }

    #[test]
    fn test_row_index() {
        assert_eq!(row_index(1).unwrap(), 0);
        assert!(row_index(0).is_err());
    }

    #[test]
    fn test_choose_user() {
        let one = vec![AdminAccount::new("kuma", "$argon2id$x", Role::Administrator)];
        assert_eq!(choose_user(&one, None).unwrap(), "kuma");
        assert_eq!(choose_user(&one, Some("other")).unwrap(), "other");
        assert!(choose_user(&[], None).is_err());

        let two = vec![one[0].clone(), AdminAccount::new("b", "$argon2id$y", Role::Administrator)];
        assert!(choose_user(&two, None).is_err());
    }

    #[tokio::test]
    async fn test_save_as_administrator() {
        let (auth, store) = setup();
        let rules = vec![
            AffiliateRule::new("ゆあドール", " yourdoll.jp ", "?ref=kuuhaku-lovedoll"),
            AffiliateRule::new("", "", "?ref=x"),
        ];

        let saved = save_as(&auth, &store, "kuma", "pass1234", &rules).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(store.load().await.unwrap()[0].domain, "yourdoll.jp");
    }

    #[tokio::test]
    async fn test_save_as_rejects_editor_and_bad_password() {
        let (auth, store) = setup();
        let rules = vec![AffiliateRule::new("", "yourdoll.jp", "ref=x")];

        let err = save_as(&auth, &store, "writer", "pass1234", &rules)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AuthError>(),
            Some(AuthError::InsufficientPermissions)
        ));

        let err = save_as(&auth, &store, "kuma", "wrong", &rules)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AuthError>(),
            Some(AuthError::InvalidCredentials)
        ));

        assert!(store.load().await.unwrap().is_empty());
    }
}
