//! Affiliate rules and the settings object handed to the rewriter.

use serde::{Deserialize, Deserializer, Serialize};

/// A site whose outbound links get affiliate parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffiliateRule {
    /// Display name, may be empty.
    #[serde(default)]
    pub name: String,
    /// Matched as a plain substring of the candidate URL.
    #[serde(default)]
    pub domain: String,
    /// Query fragment such as `?ref=kuuhaku-lovedoll` or `a=1&b=2`.
    #[serde(default)]
    pub param: String,
    #[serde(default = "default_enabled", deserialize_with = "lenient_bool")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for AffiliateRule {
    fn default() -> Self {
        Self {
            name: String::new(),
            domain: String::new(),
            param: String::new(),
            enabled: true,
        }
    }
}

impl AffiliateRule {
    pub fn new(name: impl Into<String>, domain: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            param: param.into(),
            enabled: true,
        }
    }

    /// Set whether the rule is enabled.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Copy with every text field trimmed.
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            domain: self.domain.trim().to_string(),
            param: self.param.trim().to_string(),
            enabled: self.enabled,
        }
    }

    /// Whether the rule has both a domain and a param after trimming.
    pub fn is_complete(&self) -> bool {
        !self.domain.trim().is_empty() && !self.param.trim().is_empty()
    }

    /// Whether the rule applies to `url`.
    pub fn matches(&self, url: &str) -> bool {
        !self.domain.is_empty() && url.contains(self.domain.as_str())
    }

    /// Key/value pairs of the param.
    ///
    /// A leading `?` is dropped, pairs are split on `&` and then on `=`. The
    /// value is the text between the first and second `=`; anything after a
    /// second `=` is ignored. Pairs with an empty key or value are skipped.
    pub fn param_pairs(&self) -> Vec<(&str, &str)> {
        let param = self.param.trim();
        let param = param.strip_prefix('?').unwrap_or(param);
        param
            .split('&')
            .filter_map(|pair| {
                let mut parts = pair.split('=');
                Some((parts.next()?, parts.next()?))
            })
            .filter(|(key, value)| !key.is_empty() && !value.is_empty())
            .collect()
    }

    /// Display label: the name, or the domain when unnamed.
    pub fn label(&self) -> &str {
        if self.name.trim().is_empty() {
            self.domain.trim()
        } else {
            self.name.trim()
        }
    }
}

/// Trim every rule and drop the incomplete ones.
pub fn sanitize_rules(rules: &[AffiliateRule]) -> Vec<AffiliateRule> {
    rules
        .iter()
        .map(AffiliateRule::trimmed)
        .filter(AffiliateRule::is_complete)
        .collect()
}

/// Rule configuration passed explicitly to the rewriter and the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffiliateSettings {
    #[serde(default)]
    pub links: Vec<AffiliateRule>,
}

impl AffiliateSettings {
    pub fn new(links: Vec<AffiliateRule>) -> Self {
        Self { links }
    }

    /// Enabled rules, in order.
    pub fn enabled(&self) -> impl Iterator<Item = &AffiliateRule> {
        self.links.iter().filter(|r| r.enabled)
    }

    /// Settings holding only the enabled rules.
    pub fn enabled_only(&self) -> Self {
        Self {
            links: self.enabled().cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Accept `true`/`false`, `1`/`0` and their string forms.
///
/// Rule lists saved by older form posts carry `"1"` and `"true"`.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
        Flag::Text(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "on" | "yes"),
    })
}
