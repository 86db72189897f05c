//! Audit the links of a rendered page against the saved rules.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::{Context as _, Result};
use console::style;
use parking_lot::Mutex;
use serde::Serialize;

use kuuhaku_links::{HtmlPage, LinkRewriter, PassReport, Rescanner, ORIGINAL_HREF_ATTR};

use super::AuditArgs;
use crate::context::Context;
use crate::output::truncate;

/// How one link fares under the current rules.
#[derive(Debug, Clone, Serialize)]
pub struct LinkAudit {
    pub text: String,
    pub href: String,
    pub converted: String,
    pub matched_rules: Vec<String>,
}

impl LinkAudit {
    fn changed(&self) -> bool {
        self.href != self.converted
    }
}

/// Run the audit command.
pub async fn run(args: AuditArgs, ctx: &Context) -> Result<()> {
    let path = ctx.resolve_path(&args.file);
    let html = read_page(&path)?;

    let access = ctx.open_rules().await?;
    let settings = access.rules.settings().await;
    access.close().await;
    let rewriter = LinkRewriter::new(&settings.context("Failed to load affiliate links")?);
    ctx.output
        .debug(&format!("{} enabled rule(s)", rewriter.rule_count()));

    let page = HtmlPage::parse(&html);
    print_audit(&page, &rewriter, args.all, ctx);

    let out = args.write.as_deref().map(|out| ctx.resolve_path(out));
    if let Some(out) = &out {
        let (rewritten, report) = rewrite_page(&page, &rewriter);
        write_page(&rewritten, out)?;
        ctx.output.success(&format!(
            "Wrote {} ({} link(s) rewritten)",
            out.display(),
            report.converted
        ));
    }

    if args.watch {
        watch(path, out, page, rewriter, &args, ctx).await?;
    }
    Ok(())
}

/// A copy of `page` with the rewriter applied.
pub fn rewrite_page(page: &HtmlPage, rewriter: &LinkRewriter) -> (HtmlPage, PassReport) {
    let mut rewritten = page.clone();
    let report = rewriter.apply(&mut rewritten);
    (rewritten, report)
}

fn write_page(page: &HtmlPage, out: &Path) -> Result<()> {
    std::fs::write(out, page.to_html())
        .with_context(|| format!("Failed to write {}", out.display()))
}

/// Rewrite every link of `page` without touching it.
///
/// Links a pass would skip are reported unchanged with no matched rules.
pub fn audit_page(page: &HtmlPage, rewriter: &LinkRewriter) -> Vec<LinkAudit> {
    page.anchors()
        .iter()
        .filter_map(|anchor| {
            let href = anchor.href()?;
            let (converted, matched_rules) = if LinkRewriter::is_candidate(href) {
                let rewrite = rewriter.rewrite(href);
                (rewrite.converted, rewrite.matched_rules)
            } else {
                (href.to_string(), Vec::new())
            };
            Some(LinkAudit {
                text: anchor.text.clone(),
                href: href.to_string(),
                converted,
                matched_rules,
            })
        })
        .collect()
}

fn print_audit(page: &HtmlPage, rewriter: &LinkRewriter, all: bool, ctx: &Context) {
    let audits = audit_page(page, rewriter);

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "title": page.title(),
            "links": audits,
        }));
        return;
    }

    ctx.output
        .header(&format!("Links in {}", page.title().unwrap_or("(untitled)")));

    let mut changed = 0;
    for audit in &audits {
        if audit.changed() {
            changed += 1;
            println!(
                "  {} {}",
                style("→").green(),
                truncate(&audit.href, 80)
            );
            println!("    {}", style(&audit.converted).green());
            println!(
                "    {}",
                style(format!("via {}", audit.matched_rules.join(", "))).dim()
            );
        } else if all {
            let note = if LinkRewriter::is_candidate(&audit.href) {
                "no rule"
            } else {
                "skipped"
            };
            println!(
                "  {} {} {}",
                style("·").dim(),
                truncate(&audit.href, 80),
                style(note).dim()
            );
        }
    }

    ctx.output.info("");
    ctx.output
        .info(&format!("{} of {} link(s) would be rewritten", changed, audits.len()));
}

fn read_page(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Poll the file and feed changes to a rescanner until Ctrl-C.
async fn watch(
    path: PathBuf,
    out: Option<PathBuf>,
    page: HtmlPage,
    rewriter: LinkRewriter,
    args: &AuditArgs,
    ctx: &Context,
) -> Result<()> {
    let surface = Arc::new(Mutex::new(page));
    let rescanner = Rescanner::spawn_with_debounce(
        rewriter.clone(),
        surface.clone(),
        ctx.config.rewriter.debounce(),
    );
    let mut status = rescanner.subscribe();

    ctx.output.info(&format!(
        "Watching {} (Ctrl-C to stop)",
        path.display()
    ));

    let mut last_modified = modified(&path);
    let mut ticker = tokio::time::interval(Duration::from_millis(args.interval_ms.max(50)));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                let current = modified(&path);
                if current == last_modified {
                    continue;
                }
                last_modified = current;
                match read_page(&path) {
                    Ok(html) => {
                        *surface.lock() = HtmlPage::parse(&html);
                        rescanner.notify();
                    }
                    Err(e) => ctx.output.warn(&format!("{:#}", e)),
                }
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *status.borrow_and_update();
                let page = surface.lock().clone();
                report_pass(current.passes, current.last, &page, ctx);
                if let Some(out) = &out {
                    if let Err(e) = write_page(&page, out) {
                        ctx.output.warn(&format!("{:#}", e));
                    }
                }
            }
        }
    }

    rescanner.shutdown().await;
    Ok(())
}

/// Print what a rescan pass did to the watched page.
fn report_pass(passes: u64, report: PassReport, page: &HtmlPage, ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "pass": passes,
            "report": report,
            "converted": converted_links(page),
        }));
        return;
    }

    ctx.output.info(&format!(
        "Pass {}: scanned {}, converted {}, skipped {}",
        passes, report.scanned, report.converted, report.skipped
    ));
    for (original, href) in converted_links(page) {
        ctx.output.debug(&format!("{} -> {}", original, href));
    }
}

/// `(original, rewritten)` for every link a pass has marked.
fn converted_links(page: &HtmlPage) -> Vec<(String, String)> {
    page.anchors()
        .iter()
        .filter(|anchor| anchor.is_converted())
        .filter_map(|anchor| {
            Some((
                anchor.attribute(ORIGINAL_HREF_ATTR)?.to_string(),
                anchor.href()?.to_string(),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuuhaku_links::{AffiliateRule, AffiliateSettings};

    const PAGE: &str = r#"<html><head><title>おすすめ</title></head><body>
        <a href="https://yourdoll.jp/product/qtd207-lovedoll/">QTD 207</a>
        <a href="https://yourdoll.jp/product/x/?utm_source=ig">X</a>
        <a href="/about">About</a>
        <a href="https://example.com/">Other</a>
    </body></html>"#;

    fn rewriter() -> LinkRewriter {
        LinkRewriter::new(&AffiliateSettings::new(vec![AffiliateRule::new(
            "ゆあドール",
            "yourdoll.jp",
            "?ref=kuuhaku-lovedoll",
        )]))
    }

    #[test]
    fn test_audit_page() {
        let page = HtmlPage::parse(PAGE);
        let audits = audit_page(&page, &rewriter());

        assert_eq!(audits.len(), 4);
        assert_eq!(
            audits[0].converted,
            "https://yourdoll.jp/product/qtd207-lovedoll/?ref=kuuhaku-lovedoll"
        );
        assert_eq!(audits[0].matched_rules, vec!["ゆあドール"]);
        assert_eq!(
            audits[1].converted,
            "https://yourdoll.jp/product/x/?utm_source=ig&ref=kuuhaku-lovedoll"
        );
        assert!(!audits[2].changed());
        assert!(!audits[3].changed());
        assert_eq!(audits[0].text, "QTD 207");
    }

    #[test]
    fn test_audit_skips_relative_links() {
        let page = HtmlPage::parse(
            r#"<a href="/go/yourdoll.jp/">Go</a><a href="mailto:shop@yourdoll.jp">Mail</a>"#,
        );
        let audits = audit_page(&page, &rewriter());

        assert_eq!(audits.len(), 2);
        for audit in &audits {
            assert!(!audit.changed());
            assert!(audit.matched_rules.is_empty());
        }
        assert_eq!(audits[0].converted, "/go/yourdoll.jp/");
    }

    #[test]
    fn test_rewrite_page_output() {
        let page = HtmlPage::parse(PAGE);
        let (rewritten, report) = rewrite_page(&page, &rewriter());
        assert_eq!(report.converted, 2);
        assert!(converted_links(&page).is_empty());

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.html");
        write_page(&rewritten, &out).unwrap();

        let written = HtmlPage::parse(&std::fs::read_to_string(&out).unwrap());
        assert_eq!(written.title(), Some("おすすめ"));
        assert_eq!(
            written.anchors()[0].href(),
            Some("https://yourdoll.jp/product/qtd207-lovedoll/?ref=kuuhaku-lovedoll")
        );
        assert_eq!(
            written.anchors()[0].attribute(ORIGINAL_HREF_ATTR),
            Some("https://yourdoll.jp/product/qtd207-lovedoll/")
        );
        assert_eq!(written.anchors()[2].href(), Some("/about"));
        assert_eq!(converted_links(&written).len(), 2);
    }

    #[test]
    fn test_audit_does_not_modify_page() {
        let page = HtmlPage::parse(PAGE);
        audit_page(&page, &rewriter());
        assert_eq!(
            page.anchors()[0].href(),
            Some("https://yourdoll.jp/product/qtd207-lovedoll/")
        );
        assert!(converted_links(&page).is_empty());
    }

    #[test]
    fn test_converted_links_after_pass() {
        let mut page = HtmlPage::parse(PAGE);
        let report = rewriter().apply(&mut page);
        assert_eq!(report.converted, 2);

        let converted = converted_links(&page);
        assert_eq!(converted.len(), 2);
        assert_eq!(converted[0].0, "https://yourdoll.jp/product/qtd207-lovedoll/");
        assert_eq!(
            converted[0].1,
            "https://yourdoll.jp/product/qtd207-lovedoll/?ref=kuuhaku-lovedoll"
        );
    }
}
