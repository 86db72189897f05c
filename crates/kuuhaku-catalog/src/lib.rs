//! Product and blog-post domain types for the Kuuhaku affiliate site.
//!
//! This crate holds everything the ingestion pipeline needs that is not tied
//! to a particular storage engine or transport:
//!
//! - **Products**: scraped product submissions, validation, price normalization
//! - **Posts**: automatically generated blog posts and their permalinks
//! - **Repositories**: storage traits plus an in-memory implementation
//!
//! # Example
//!
//! ```rust,ignore
//! use kuuhaku_catalog::prelude::*;
//!
//! let submission: ProductSubmission = serde_json::from_value(json)?;
//! let valid = submission.validate()?;
//!
//! match repo.insert_unique(&valid.product).await? {
//!     Insertion::Created(item) => println!("created {}", item.id),
//!     Insertion::Existing(item) => println!("already known as {}", item.id),
//! }
//! ```

pub mod error;
pub mod ids;
pub mod price;

pub mod memory;
pub mod post;
pub mod product;
pub mod repository;

pub use error::CatalogError;
pub use ids::{PostId, ProductId};
pub use price::{normalize_price, RawPrice, PRICE_CEILING};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CatalogError;
    pub use crate::ids::{PostId, ProductId};
    pub use crate::memory::MemoryCatalog;
    pub use crate::post::{BlogPost, BlogPostRequest, NewBlogPost, PostStatus};
    pub use crate::price::{normalize_price, RawPrice, PRICE_CEILING};
    pub use crate::product::{NewProduct, ProductItem, ProductSubmission, ValidSubmission};
    pub use crate::repository::{
        Insertion, PageRequest, PostPage, PostRepository, ProductRepository, LIST_LIMIT,
    };
}

/// Get current Unix timestamp.
pub(crate) fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
