//! Affiliate links for the Kuuhaku affiliate site.
//!
//! - **Rules**: which sites get which query parameters ([`AffiliateRule`])
//! - **Store**: the persisted rule list, replaced wholesale on save
//! - **Editor**: unsaved working copy with preview, stats and a test harness
//! - **Rewriter**: adds missing parameters to matching links on a page
//! - **Rescanner**: re-runs the rewriter when page content changes
//!
//! # Example
//!
//! ```rust,ignore
//! use kuuhaku_links::prelude::*;
//!
//! let settings = store.settings().await?;
//! let rewriter = LinkRewriter::new(&settings);
//!
//! let mut page = HtmlPage::parse(&html);
//! let report = rewriter.apply(&mut page);
//! println!("{} links converted", report.converted);
//! std::fs::write("out.html", page.to_html())?;
//! ```

mod bootstrap;
mod editor;
mod error;
mod rescan;
mod rewrite;
mod rule;
mod store;
mod surface;

pub use bootstrap::{settings_script, SETTINGS_GLOBAL};
pub use editor::{
    preview, stats, test_convert, Confirmation, RuleEdit, RuleEditor, RuleStats, TestConversion,
    PREVIEW_PLACEHOLDER,
};
pub use error::LinkError;
pub use rescan::{ContentChanged, RescanStatus, Rescanner, DEFAULT_DEBOUNCE};
pub use rewrite::{LinkRewriter, PassReport, Rewrite};
pub use rule::{sanitize_rules, AffiliateRule, AffiliateSettings};
pub use store::{RuleStore, RULES_OPTION, SAVE_ACTION};
pub use surface::{Anchor, HtmlPage, LinkSurface, Page, CONVERTED_ATTR, ORIGINAL_HREF_ATTR};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        AffiliateRule, AffiliateSettings, Anchor, Confirmation, ContentChanged, HtmlPage,
        LinkError, LinkRewriter, LinkSurface, Page, Rescanner, RuleEditor, RuleStore,
    };
}
