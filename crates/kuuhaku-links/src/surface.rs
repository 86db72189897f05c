//! Link surfaces: collections of hyperlinks the rewriter can walk.

use std::collections::BTreeMap;

use scraper::node::Element;
use scraper::{Html, Node, Selector};
use serde::{Deserialize, Serialize};

/// Attribute recording the href before rewriting.
pub const ORIGINAL_HREF_ATTR: &str = "data-original-href";
/// Attribute marking a rewritten link.
pub const CONVERTED_ATTR: &str = "data-affiliate-converted";

/// Anything holding hyperlinks addressable by position.
pub trait LinkSurface {
    /// Number of links.
    fn link_count(&self) -> usize;

    /// Read an attribute of the link at `index`.
    fn attribute(&self, index: usize, name: &str) -> Option<&str>;

    /// Set an attribute of the link at `index`. Out-of-range indexes are ignored.
    fn set_attribute(&mut self, index: usize, name: &str, value: &str);

    /// The link's `href`.
    fn href(&self, index: usize) -> Option<&str> {
        self.attribute(index, "href")
    }
}

/// A hyperlink and its attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    /// Visible link text.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Anchor {
    /// Create an anchor with an href.
    pub fn new(href: impl Into<String>) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert("href".to_string(), href.into());
        Self {
            text: String::new(),
            attributes,
        }
    }

    /// Set the link text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn href(&self) -> Option<&str> {
        self.attribute("href")
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    /// Whether the rewriter changed this link.
    pub fn is_converted(&self) -> bool {
        self.attribute(CONVERTED_ATTR) == Some("true")
    }
}

/// An in-memory page of anchors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub anchors: Vec<Anchor>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a page from a list of hrefs.
    pub fn from_hrefs<I, S>(hrefs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            anchors: hrefs.into_iter().map(Anchor::new).collect(),
        }
    }

    /// Append a link, as content loaded after the first pass would.
    pub fn push(&mut self, anchor: Anchor) {
        self.anchors.push(anchor);
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }
}

impl LinkSurface for Page {
    fn link_count(&self) -> usize {
        self.anchors.len()
    }

    fn attribute(&self, index: usize, name: &str) -> Option<&str> {
        self.anchors.get(index).and_then(|a| a.attribute(name))
    }

    fn set_attribute(&mut self, index: usize, name: &str, value: &str) {
        if let Some(anchor) = self.anchors.get_mut(index) {
            anchor.set_attribute(name, value);
        }
    }
}

/// Links extracted from an HTML document.
///
/// The source is kept so the rewritten links can be written back out with
/// [`HtmlPage::to_html`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlPage {
    source: String,
    title: Option<String>,
    page: Page,
}

impl HtmlPage {
    /// Parse a document and collect every `a[href]`.
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);

        let title = Selector::parse("title").ok().and_then(|sel| {
            document
                .select(&sel)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .filter(|t| !t.is_empty())
        });

        let mut page = Page::new();
        if let Some(sel) = anchor_selector() {
            for element in document.select(&sel) {
                let attributes = element
                    .value()
                    .attrs()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect();
                let text = element
                    .text()
                    .collect::<Vec<_>>()
                    .join(" ")
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ");
                page.push(Anchor { text, attributes });
            }
        }

        Self {
            source: html.to_string(),
            title,
            page,
        }
    }

    /// Serialize the document with the current attributes of every link.
    ///
    /// Only attributes are touched; the rest of the document is what the
    /// HTML parser produced from the source.
    pub fn to_html(&self) -> String {
        let mut document = Html::parse_document(&self.source);
        let ids: Vec<_> = match anchor_selector() {
            Some(sel) => document.select(&sel).map(|el| el.id()).collect(),
            None => Vec::new(),
        };

        for (id, anchor) in ids.into_iter().zip(self.page.anchors()) {
            if let Some(mut node) = document.tree.get_mut(id) {
                if let Node::Element(element) = node.value() {
                    write_attributes(element, &anchor.attributes);
                }
            }
        }
        document.html()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn anchors(&self) -> &[Anchor] {
        self.page.anchors()
    }

    pub fn into_page(self) -> Page {
        self.page
    }
}

fn anchor_selector() -> Option<Selector> {
    Selector::parse("a[href]").ok()
}

/// Copy `attributes` onto a parsed element, adding the missing ones.
fn write_attributes(element: &mut Element, attributes: &BTreeMap<String, String>) {
    let Some(template) = element.attrs.keys().next().cloned() else {
        return;
    };
    for (name, value) in attributes {
        if let Some((_, current)) = element
            .attrs
            .iter_mut()
            .find(|(key, _)| &*key.local == name.as_str())
        {
            if &**current != value.as_str() {
                *current = value.as_str().into();
            }
            continue;
        }
        let mut key = template.clone();
        key.local = name.as_str().into();
        element.attrs.insert(key, value.as_str().into());
    }
}

impl LinkSurface for HtmlPage {
    fn link_count(&self) -> usize {
        self.page.link_count()
    }

    fn attribute(&self, index: usize, name: &str) -> Option<&str> {
        self.page.attribute(index, name)
    }

    fn set_attribute(&mut self, index: usize, name: &str, value: &str) {
        self.page.set_attribute(index, name, value);
    }
}
