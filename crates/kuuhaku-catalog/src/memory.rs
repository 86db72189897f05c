//! In-memory catalog, used by tests and the CLI dry runs.

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::current_timestamp;
use crate::error::CatalogError;
use crate::ids::{PostId, ProductId};
use crate::post::{BlogPost, NewBlogPost};
use crate::product::{NewProduct, ProductItem};
use crate::repository::{Insertion, PageRequest, PostPage, PostRepository, ProductRepository};

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    products: Vec<ProductItem>,
    posts: Vec<BlogPost>,
}

impl Inner {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Products and posts held in memory, sharing one id sequence.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    inner: RwLock<Inner>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored products.
    pub fn product_count(&self) -> usize {
        self.inner.read().products.len()
    }
}

#[async_trait]
impl ProductRepository for MemoryCatalog {
    async fn find_by_product_url(&self, url: &str) -> Result<Option<ProductItem>, CatalogError> {
        Ok(self
            .inner
            .read()
            .products
            .iter()
            .find(|p| p.product_url == url)
            .cloned())
    }

    async fn insert_unique(&self, product: &NewProduct) -> Result<Insertion, CatalogError> {
        // Check and insert under one write lock.
        let mut inner = self.inner.write();
        if let Some(existing) = inner
            .products
            .iter()
            .find(|p| p.product_url == product.product_url)
        {
            return Ok(Insertion::Existing(existing.clone()));
        }
        let id = ProductId::new(inner.allocate_id());
        let item = ProductItem::from_new(id, product, current_timestamp());
        inner.products.push(item.clone());
        Ok(Insertion::Created(item))
    }

    async fn set_image_url(&self, id: ProductId, image_url: &str) -> Result<(), CatalogError> {
        let mut inner = self.inner.write();
        let item = inner
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CatalogError::ProductNotFound(id.to_string()))?;
        item.image_url = image_url.to_string();
        Ok(())
    }

    async fn get(&self, id: ProductId) -> Result<Option<ProductItem>, CatalogError> {
        Ok(self
            .inner
            .read()
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<ProductItem>, CatalogError> {
        Ok(self
            .inner
            .read()
            .products
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PostRepository for MemoryCatalog {
    async fn insert(&self, post: NewBlogPost) -> Result<BlogPost, CatalogError> {
        let mut inner = self.inner.write();
        let id = PostId::new(inner.allocate_id());
        let stored = BlogPost::from_new(id, post, current_timestamp());
        inner.posts.push(stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: PostId) -> Result<Option<BlogPost>, CatalogError> {
        Ok(self.inner.read().posts.iter().find(|p| p.id == id).cloned())
    }

    async fn list_generated(&self, page: PageRequest) -> Result<PostPage, CatalogError> {
        let inner = self.inner.read();
        let generated: Vec<&BlogPost> = inner.posts.iter().filter(|p| p.auto_generated).collect();
        let total = generated.len() as u64;
        let posts = generated
            .into_iter()
            .rev()
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .cloned()
            .collect();
        Ok(PostPage {
            posts,
            total,
            total_pages: page.total_pages(total),
        })
    }
}
