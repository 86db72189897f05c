//! The settings bootstrap script embedded into rendered pages.

use crate::error::LinkError;
use crate::rule::AffiliateSettings;

/// Global the page-side rewriter reads its settings from.
pub const SETTINGS_GLOBAL: &str = "lovedollAffiliateSettings";

/// Render `window.lovedollAffiliateSettings = {...};` for the enabled rules.
///
/// `</` is escaped so a rule value cannot close the surrounding script tag.
pub fn settings_script(settings: &AffiliateSettings) -> Result<String, LinkError> {
    let json = serde_json::to_string(&settings.enabled_only())?;
    Ok(format!(
        "window.{} = {};\n",
        SETTINGS_GLOBAL,
        json.replace("</", "<\\/")
    ))
}
