//! Product ingestion.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use kuuhaku_catalog::prelude::*;
use kuuhaku_media::{ImageRequest, ImageResolver};

/// Product as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPayload {
    pub id: ProductId,
    pub title: String,
    pub product_url: String,
    pub price: i64,
    pub image_url: String,
}

impl From<&ProductItem> for ProductPayload {
    fn from(item: &ProductItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            product_url: item.product_url.clone(),
            price: item.price,
            image_url: item.image_url.clone(),
        }
    }
}

/// Result of one ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Created(ProductItem),
    /// The product URL was already known; nothing was changed.
    Existing(ProductItem),
}

impl IngestOutcome {
    pub fn item(&self) -> &ProductItem {
        match self {
            IngestOutcome::Created(item) | IngestOutcome::Existing(item) => item,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, IngestOutcome::Created(_))
    }
}

/// Validates, deduplicates and stores scraped products.
#[derive(Clone)]
pub struct IngestService {
    products: Arc<dyn ProductRepository>,
    images: ImageResolver,
}

impl IngestService {
    pub fn new(products: Arc<dyn ProductRepository>, images: ImageResolver) -> Self {
        Self { products, images }
    }

    /// Ingest one submission.
    ///
    /// Validation failures leave storage untouched. Image problems never
    /// fail the request; the product then keeps its remote image URL.
    pub async fn ingest(&self, submission: ProductSubmission) -> Result<IngestOutcome, CatalogError> {
        let valid = submission.validate()?;

        let mut item = match self.products.insert_unique(&valid.product).await? {
            Insertion::Existing(item) => {
                tracing::debug!(id = %item.id, product_url = %item.product_url, "product already ingested");
                return Ok(IngestOutcome::Existing(item));
            }
            Insertion::Created(item) => item,
        };

        let resolved = self
            .images
            .resolve(&ImageRequest {
                source_url: &item.source_image_url,
                product_url: &item.product_url,
                title: &item.title,
                image_content: valid.image_content.as_deref(),
                image_name: valid.image_name.as_deref(),
            })
            .await;

        if resolved.url != item.image_url {
            match self.products.set_image_url(item.id, &resolved.url).await {
                Ok(()) => item.image_url = resolved.url,
                Err(e) => {
                    tracing::warn!(id = %item.id, error = %e, "could not record re-hosted image")
                }
            }
        }

        tracing::info!(
            id = %item.id,
            price = item.price,
            image = resolved.source.as_str(),
            "product ingested"
        );
        Ok(IngestOutcome::Created(item))
    }

    /// Newest products, for scraper-side duplicate checks.
    pub async fn list(&self) -> Result<Vec<ProductPayload>, CatalogError> {
        let items = self.products.list_recent(LIST_LIMIT).await?;
        Ok(items.iter().map(ProductPayload::from).collect())
    }
}

impl std::fmt::Debug for IngestService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestService")
            .field("images", &self.images)
            .finish_non_exhaustive()
    }
}
