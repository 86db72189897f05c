//! The admin rule editor.
//!
//! The editor holds an unsaved working copy of the rule list. Rows can be
//! added, edited, toggled and deleted freely; nothing reaches storage until
//! the working set is handed to [`crate::RuleStore::replace_all`].

use serde::{Deserialize, Serialize};

use crate::error::LinkError;
use crate::rewrite::LinkRewriter;
use crate::rule::{sanitize_rules, AffiliateRule, AffiliateSettings};

/// Shown in place of a preview URL for incomplete rows.
pub const PREVIEW_PLACEHOLDER: &str = "設定してください";

/// Asks the operator before a destructive edit.
pub trait Confirmation {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirmation for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Partial update of a row. `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEdit {
    pub name: Option<String>,
    pub domain: Option<String>,
    pub param: Option<String>,
    pub enabled: Option<bool>,
}

/// Row counts for the editor header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleStats {
    pub total: usize,
    pub active: usize,
}

/// Result of the conversion test harness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestConversion {
    pub original: String,
    pub converted: String,
    pub matched: bool,
    pub matched_rules: Vec<String>,
}

/// Preview URL for a rule, or the placeholder when incomplete.
pub fn preview(rule: &AffiliateRule) -> String {
    let domain = rule.domain.trim();
    let param = rule.param.trim();
    if domain.is_empty() || param.is_empty() {
        PREVIEW_PLACEHOLDER.to_string()
    } else {
        format!("https://{}/example/product/{}", domain, param)
    }
}

/// Counts for a rule list.
pub fn stats(rules: &[AffiliateRule]) -> RuleStats {
    RuleStats {
        total: rules.len(),
        active: rules.iter().filter(|r| r.enabled).count(),
    }
}

/// Run the rewriter over a single URL using an unsaved rule list.
pub fn test_convert(rules: &[AffiliateRule], url: &str) -> Result<TestConversion, LinkError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(LinkError::EmptyTestUrl);
    }
    let settings = AffiliateSettings::new(sanitize_rules(rules));
    let rewrite = LinkRewriter::new(&settings).rewrite(url);
    Ok(TestConversion {
        matched: rewrite.matched(),
        original: rewrite.original,
        converted: rewrite.converted,
        matched_rules: rewrite.matched_rules,
    })
}

/// Working copy of the rule list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleEditor {
    rules: Vec<AffiliateRule>,
}

impl RuleEditor {
    /// Start editing from the persisted rules.
    pub fn new(rules: Vec<AffiliateRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[AffiliateRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Append an empty, enabled row. Returns its index.
    pub fn add(&mut self) -> usize {
        self.rules.push(AffiliateRule::default());
        self.rules.len() - 1
    }

    /// Append a filled-in row. Returns its index.
    pub fn push(&mut self, rule: AffiliateRule) -> usize {
        self.rules.push(rule);
        self.rules.len() - 1
    }

    /// Update fields of a row.
    pub fn edit(&mut self, index: usize, edit: RuleEdit) -> Result<&AffiliateRule, LinkError> {
        let rule = self
            .rules
            .get_mut(index)
            .ok_or(LinkError::RowOutOfRange(index))?;
        if let Some(name) = edit.name {
            rule.name = name;
        }
        if let Some(domain) = edit.domain {
            rule.domain = domain;
        }
        if let Some(param) = edit.param {
            rule.param = param;
        }
        if let Some(enabled) = edit.enabled {
            rule.enabled = enabled;
        }
        Ok(rule)
    }

    /// Flip a row's enabled flag. Returns the new value.
    pub fn toggle(&mut self, index: usize) -> Result<bool, LinkError> {
        let rule = self
            .rules
            .get_mut(index)
            .ok_or(LinkError::RowOutOfRange(index))?;
        rule.enabled = !rule.enabled;
        Ok(rule.enabled)
    }

    /// Remove a row if the operator confirms. Returns the removed rule.
    pub fn delete(
        &mut self,
        index: usize,
        confirmation: &dyn Confirmation,
    ) -> Result<Option<AffiliateRule>, LinkError> {
        let rule = self.rules.get(index).ok_or(LinkError::RowOutOfRange(index))?;
        let prompt = if rule.label().is_empty() {
            "このサイトを削除しますか？".to_string()
        } else {
            format!("「{}」を削除しますか？", rule.label())
        };
        if !confirmation.confirm(&prompt) {
            return Ok(None);
        }
        Ok(Some(self.rules.remove(index)))
    }

    /// Preview for every row.
    pub fn previews(&self) -> Vec<String> {
        self.rules.iter().map(preview).collect()
    }

    pub fn stats(&self) -> RuleStats {
        stats(&self.rules)
    }

    /// Run the test harness against the working set.
    pub fn test_convert(&self, url: &str) -> Result<TestConversion, LinkError> {
        test_convert(&self.rules, url)
    }

    /// Rules as they will be persisted: trimmed, incomplete rows dropped.
    pub fn collect_for_save(&self) -> Vec<AffiliateRule> {
        sanitize_rules(&self.rules)
    }

    pub fn into_rules(self) -> Vec<AffiliateRule> {
        self.rules
    }
}
