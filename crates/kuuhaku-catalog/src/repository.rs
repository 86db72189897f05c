//! Storage traits for products and posts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::ids::{PostId, ProductId};
use crate::post::{BlogPost, NewBlogPost};
use crate::product::{NewProduct, ProductItem};

/// Maximum number of products returned by a listing.
pub const LIST_LIMIT: usize = 200;

/// Outcome of a unique insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// A new record was created.
    Created(ProductItem),
    /// A record with the same product URL already existed; it is returned unchanged.
    Existing(ProductItem),
}

impl Insertion {
    pub fn item(&self) -> &ProductItem {
        match self {
            Insertion::Created(item) | Insertion::Existing(item) => item,
        }
    }

    pub fn into_item(self) -> ProductItem {
        match self {
            Insertion::Created(item) | Insertion::Existing(item) => item,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Insertion::Created(_))
    }
}

/// Product persistence.
///
/// Implementations must make `insert_unique` atomic with respect to
/// `product_url`: concurrent inserts of the same URL yield exactly one
/// `Created` and the rest `Existing`.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Look up a product by its source URL.
    async fn find_by_product_url(&self, url: &str) -> Result<Option<ProductItem>, CatalogError>;

    /// Insert unless a product with the same URL exists.
    async fn insert_unique(&self, product: &NewProduct) -> Result<Insertion, CatalogError>;

    /// Record the final image URL after sideloading.
    async fn set_image_url(&self, id: ProductId, image_url: &str) -> Result<(), CatalogError>;

    /// Get a product by id.
    async fn get(&self, id: ProductId) -> Result<Option<ProductItem>, CatalogError>;

    /// Newest products first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<ProductItem>, CatalogError>;
}

/// Pagination over generated posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub per_page: u32,
    pub page: u32,
}

impl PageRequest {
    pub const DEFAULT_PER_PAGE: u32 = 10;
    pub const MAX_PER_PAGE: u32 = 100;

    /// Build a request, clamping values into range.
    pub fn new(per_page: Option<u32>, page: Option<u32>) -> Self {
        Self {
            per_page: per_page
                .unwrap_or(Self::DEFAULT_PER_PAGE)
                .clamp(1, Self::MAX_PER_PAGE),
            page: page.unwrap_or(1).max(1),
        }
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }

    /// Pages needed to show `total` rows.
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.per_page))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of generated posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPage {
    pub posts: Vec<BlogPost>,
    pub total: u64,
    pub total_pages: u64,
}

/// Post persistence.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Store a new post.
    async fn insert(&self, post: NewBlogPost) -> Result<BlogPost, CatalogError>;

    /// Get a post by id.
    async fn get(&self, id: PostId) -> Result<Option<BlogPost>, CatalogError>;

    /// Auto-generated posts, newest first.
    async fn list_generated(&self, page: PageRequest) -> Result<PostPage, CatalogError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults_and_clamps() {
        let p = PageRequest::default();
        assert_eq!(p.per_page, 10);
        assert_eq!(p.page, 1);

        let p = PageRequest::new(Some(0), Some(0));
        assert_eq!(p.per_page, 1);
        assert_eq!(p.page, 1);

        let p = PageRequest::new(Some(500), Some(3));
        assert_eq!(p.per_page, 100);
        assert_eq!(p.offset(), 200);
    }

    #[test]
    fn test_total_pages() {
        let p = PageRequest::new(Some(10), None);
        assert_eq!(p.total_pages(0), 0);
        assert_eq!(p.total_pages(10), 1);
        assert_eq!(p.total_pages(11), 2);
    }
}
