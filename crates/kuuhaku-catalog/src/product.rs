//! Scraped product submissions and stored product items.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CatalogError;
use crate::ids::ProductId;
use crate::price::{normalize_price, RawPrice, PRICE_CEILING};

/// A product record as submitted by a scraper.
///
/// Field names follow the scrapers' snake_case payloads; camelCase aliases are
/// accepted as well.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductSubmission {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<RawPrice>,
    #[serde(default, alias = "imageUrl")]
    pub image_url: Option<String>,
    #[serde(default, alias = "productUrl")]
    pub product_url: Option<String>,
    /// Base64-encoded image bytes fetched by the scraper itself.
    #[serde(default, alias = "imageContent")]
    pub image_content: Option<String>,
    #[serde(default, alias = "imageName")]
    pub image_name: Option<String>,
}

/// A submission that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidSubmission {
    pub product: NewProduct,
    pub image_content: Option<String>,
    pub image_name: Option<String>,
}

impl ProductSubmission {
    /// Validate and normalize the submission.
    ///
    /// Missing or unusable required fields (including a price that normalizes
    /// to zero or less) yield [`CatalogError::InvalidParams`]; a price at or
    /// above [`PRICE_CEILING`] yields [`CatalogError::PriceTooHigh`].
    pub fn validate(self) -> Result<ValidSubmission, CatalogError> {
        let title = self.title.as_deref().map(sanitize_text).unwrap_or_default();
        let price = self
            .price
            .as_ref()
            .and_then(normalize_price)
            .filter(|p| *p > 0);
        let image_url = self.image_url.as_deref().and_then(clean_url);
        let product_url = self.product_url.as_deref().and_then(clean_url);

        let (Some(price), Some(image_url), Some(product_url)) = (price, image_url, product_url)
        else {
            return Err(missing_fields());
        };
        if title.is_empty() {
            return Err(missing_fields());
        }

        if price >= PRICE_CEILING {
            return Err(CatalogError::PriceTooHigh(price));
        }

        let image_name = self
            .image_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let image_content = self.image_content.filter(|c| !c.trim().is_empty());

        Ok(ValidSubmission {
            product: NewProduct {
                title,
                product_url,
                price,
                source_image_url: image_url,
            },
            image_content,
            image_name,
        })
    }
}

fn missing_fields() -> CatalogError {
    CatalogError::InvalidParams(
        "title, price, image_url, and product_url are required".to_string(),
    )
}

/// A validated product ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub title: String,
    /// Deduplication key.
    pub product_url: String,
    pub price: i64,
    pub source_image_url: String,
}

/// A stored product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductItem {
    pub id: ProductId,
    pub title: String,
    pub product_url: String,
    pub price: i64,
    /// Image URL as submitted by the scraper.
    pub source_image_url: String,
    /// Image URL to render: the re-hosted copy, or the source when sideloading failed.
    pub image_url: String,
    /// Unix timestamp of creation.
    pub created_at: i64,
}

impl ProductItem {
    /// Build a stored item from a new product and its assigned id.
    pub fn from_new(id: ProductId, product: &NewProduct, created_at: i64) -> Self {
        Self {
            id,
            title: product.title.clone(),
            product_url: product.product_url.clone(),
            price: product.price,
            source_image_url: product.source_image_url.clone(),
            image_url: product.source_image_url.clone(),
            created_at,
        }
    }

    /// Whether the image was re-hosted locally.
    pub fn has_local_image(&self) -> bool {
        self.image_url != self.source_image_url
    }
}

/// Strip markup and control whitespace from free text, then trim.
pub fn sanitize_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            '\n' | '\r' | '\t' => out.push(' '),
            _ => out.push(c),
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Accept only absolute http(s) URLs.
fn clean_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed).ok()?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Some(trimmed.to_string()),
        _ => None,
    }
}
