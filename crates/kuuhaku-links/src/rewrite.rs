//! The runtime link rewriter.
//!
//! For each absolute http(s) link, every enabled rule whose domain occurs in
//! the URL contributes its parameters. A parameter is only added when its key
//! is not already in the query, so a pass never changes an existing value and
//! running it twice is the same as running it once.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::rule::{AffiliateRule, AffiliateSettings};
use crate::surface::{LinkSurface, CONVERTED_ATTR, ORIGINAL_HREF_ATTR};

/// Outcome of rewriting one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewrite {
    pub original: String,
    pub converted: String,
    /// Labels of the rules whose domain matched.
    pub matched_rules: Vec<String>,
}

impl Rewrite {
    fn unchanged(url: &str) -> Self {
        Self {
            original: url.to_string(),
            converted: url.to_string(),
            matched_rules: Vec::new(),
        }
    }

    /// Whether any rule matched.
    pub fn matched(&self) -> bool {
        !self.matched_rules.is_empty()
    }

    /// Whether the URL changed.
    pub fn changed(&self) -> bool {
        self.original != self.converted
    }
}

/// Counters for one pass over a surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassReport {
    /// Links looked at.
    pub scanned: usize,
    /// Links whose href changed.
    pub converted: usize,
    /// Relative, empty or non-http links left alone.
    pub skipped: usize,
}

/// Applies the enabled rules of a settings object to links.
#[derive(Debug, Clone, Default)]
pub struct LinkRewriter {
    rules: Vec<AffiliateRule>,
}

impl LinkRewriter {
    /// Build a rewriter over the enabled rules of `settings`.
    pub fn new(settings: &AffiliateSettings) -> Self {
        Self {
            rules: settings
                .enabled()
                .map(AffiliateRule::trimmed)
                .filter(|r| !r.domain.is_empty())
                .collect(),
        }
    }

    /// Number of active rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Whether an href is a candidate for rewriting.
    pub fn is_candidate(href: &str) -> bool {
        href.starts_with("http://") || href.starts_with("https://")
    }

    /// Rewrite one URL.
    ///
    /// The URL is returned byte-for-byte unchanged unless a parameter was
    /// added. A URL that cannot be parsed is logged and left alone.
    pub fn rewrite(&self, url: &str) -> Rewrite {
        let matching: Vec<&AffiliateRule> = self.rules.iter().filter(|r| r.matches(url)).collect();
        if matching.is_empty() {
            return Rewrite::unchanged(url);
        }

        let mut result = Rewrite::unchanged(url);
        result.matched_rules = matching.iter().map(|r| r.label().to_string()).collect();

        let mut parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "URL parsing error, link left unchanged");
                return result;
            }
        };

        let mut appended = false;
        for rule in &matching {
            for (key, value) in rule.param_pairs() {
                if has_query_key(&parsed, key) {
                    continue;
                }
                parsed.query_pairs_mut().append_pair(key, value);
                appended = true;
            }
        }

        if appended {
            result.converted = parsed.to_string();
        }
        result
    }

    /// Rewrite every candidate link of a surface in place.
    pub fn apply<S: LinkSurface + ?Sized>(&self, surface: &mut S) -> PassReport {
        let mut report = PassReport::default();
        for index in 0..surface.link_count() {
            report.scanned += 1;
            let Some(href) = surface.href(index).map(str::to_string) else {
                report.skipped += 1;
                continue;
            };
            if !Self::is_candidate(&href) {
                report.skipped += 1;
                continue;
            }

            let rewrite = self.rewrite(&href);
            if !rewrite.changed() {
                continue;
            }

            surface.set_attribute(index, "href", &rewrite.converted);
            if surface.attribute(index, ORIGINAL_HREF_ATTR).is_none() {
                surface.set_attribute(index, ORIGINAL_HREF_ATTR, &href);
            }
            surface.set_attribute(index, CONVERTED_ATTR, "true");
            report.converted += 1;
        }

        if report.converted > 0 {
            tracing::info!(converted = report.converted, "affiliate links converted");
        }
        report
    }
}

fn has_query_key(url: &Url, key: &str) -> bool {
    url.query_pairs().any(|(k, _)| k == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Anchor, Page};

    fn yourdoll() -> AffiliateRule {
        AffiliateRule::new("YourDoll", "yourdoll.jp", "?ref=kuuhaku-lovedoll")
    }

    fn rewriter(rules: Vec<AffiliateRule>) -> LinkRewriter {
        LinkRewriter::new(&AffiliateSettings::new(rules))
    }

    #[test]
    fn test_adds_param_to_plain_url() {
        let r = rewriter(vec![yourdoll()]);
        let out = r.rewrite("https://yourdoll.jp/product/qtd207-lovedoll/");
        assert_eq!(
            out.converted,
            "https://yourdoll.jp/product/qtd207-lovedoll/?ref=kuuhaku-lovedoll"
        );
        assert_eq!(out.matched_rules, vec!["YourDoll".to_string()]);
    }

    #[test]
    fn test_appends_to_existing_query() {
        let r = rewriter(vec![yourdoll()]);
        let out = r.rewrite("https://yourdoll.jp/product/x/?utm_source=ig");
        assert_eq!(
            out.converted,
            "https://yourdoll.jp/product/x/?utm_source=ig&ref=kuuhaku-lovedoll"
        );
    }

    #[test]
    fn test_existing_key_never_overwritten() {
        let r = rewriter(vec![yourdoll()]);
        let out = r.rewrite("https://yourdoll.jp/p/?ref=someone-else");
        assert!(out.matched());
        assert!(!out.changed());
        assert_eq!(out.converted, "https://yourdoll.jp/p/?ref=someone-else");
    }

    #[test]
    fn test_matching_rules_merge() {
        let r = rewriter(vec![
            AffiliateRule::new("a", "yourdoll.jp", "ref=a&src=kuuhaku"),
            AffiliateRule::new("b", "yourdoll", "ref=b&campaign=autumn"),
        ]);
        let out = r.rewrite("https://yourdoll.jp/p/");
        assert_eq!(
            out.converted,
            "https://yourdoll.jp/p/?ref=a&src=kuuhaku&campaign=autumn"
        );
        assert_eq!(out.matched_rules.len(), 2);
    }

    #[test]
    fn test_disabled_and_unmatched_rules_ignored() {
        let r = rewriter(vec![yourdoll().with_enabled(false)]);
        assert!(!r.rewrite("https://yourdoll.jp/p/").changed());

        let r = rewriter(vec![yourdoll()]);
        let out = r.rewrite("https://kuma-doll.com/p/");
        assert!(!out.matched());
        assert!(!out.changed());
    }

    #[test]
    fn test_fragment_kept_after_query() {
        let r = rewriter(vec![yourdoll()]);
        let out = r.rewrite("https://yourdoll.jp/p/#details");
        assert_eq!(out.converted, "https://yourdoll.jp/p/?ref=kuuhaku-lovedoll#details");
    }

    #[test]
    fn test_value_stops_at_second_equals() {
        let r = rewriter(vec![AffiliateRule::new("", "yourdoll.jp", "d=4=5")]);
        let out = r.rewrite("https://yourdoll.jp/p/");
        assert_eq!(out.converted, "https://yourdoll.jp/p/?d=4");
    }

    #[test]
    fn test_unparseable_url_left_alone() {
        let r = rewriter(vec![AffiliateRule::new("", "yourdoll.jp", "ref=x")]);
        let out = r.rewrite("https://yourdoll.jp:99999/p/");
        assert!(out.matched());
        assert!(!out.changed());
    }

    #[test]
    fn test_apply_marks_links_and_is_idempotent() {
        let r = rewriter(vec![yourdoll()]);
        let mut page = Page::from_hrefs([
            "https://yourdoll.jp/product/qtd207-lovedoll/",
            "/archives/12/",
            "https://kuma-doll.com/p/",
        ]);
        page.push(Anchor::default());

        let first = r.apply(&mut page);
        assert_eq!(first.scanned, 4);
        assert_eq!(first.converted, 1);
        assert_eq!(first.skipped, 2);

        let anchor = &page.anchors()[0];
        assert!(anchor.is_converted());
        assert_eq!(
            anchor.attribute(ORIGINAL_HREF_ATTR),
            Some("https://yourdoll.jp/product/qtd207-lovedoll/")
        );

        let snapshot = page.clone();
        let second = r.apply(&mut page);
        assert_eq!(second.converted, 0);
        assert_eq!(page, snapshot);
    }

    #[test]
    fn test_first_original_href_wins() {
        let mut page = Page::from_hrefs(["https://yourdoll.jp/p/"]);
        rewriter(vec![AffiliateRule::new("", "yourdoll.jp", "a=1")]).apply(&mut page);
        rewriter(vec![AffiliateRule::new("", "yourdoll.jp", "b=2")]).apply(&mut page);

        assert_eq!(page.href(0), Some("https://yourdoll.jp/p/?a=1&b=2"));
        assert_eq!(
            page.attribute(0, ORIGINAL_HREF_ATTR),
            Some("https://yourdoll.jp/p/")
        );
    }
}
