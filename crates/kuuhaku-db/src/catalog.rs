//! Product and post repositories over SQLite.

use async_trait::async_trait;
use kuuhaku_catalog::prelude::*;
use sqlx::FromRow;

use crate::{current_timestamp, Db, DbError};

#[derive(Debug, FromRow)]
struct ProductRow {
    id: i64,
    title: String,
    product_url: String,
    price: i64,
    source_image_url: String,
    image_url: String,
    created_at: i64,
}

impl From<ProductRow> for ProductItem {
    fn from(row: ProductRow) -> Self {
        ProductItem {
            id: ProductId::new(row.id),
            title: row.title,
            product_url: row.product_url,
            price: row.price,
            source_image_url: row.source_image_url,
            image_url: row.image_url,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct PostRow {
    id: i64,
    title: String,
    content: String,
    excerpt: Option<String>,
    status: String,
    tags: String,
    categories: String,
    meta_description: Option<String>,
    target_keyword: Option<String>,
    auto_generated: bool,
    generated_at: Option<i64>,
    created_at: i64,
}

impl TryFrom<PostRow> for BlogPost {
    type Error = DbError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        Ok(BlogPost {
            id: PostId::new(row.id),
            title: row.title,
            content: row.content,
            excerpt: row.excerpt,
            status: PostStatus::from_str(&row.status).unwrap_or_default(),
            tags: serde_json::from_str(&row.tags)?,
            categories: serde_json::from_str(&row.categories)?,
            meta_description: row.meta_description,
            target_keyword: row.target_keyword,
            auto_generated: row.auto_generated,
            generated_at: row.generated_at,
            created_at: row.created_at,
        })
    }
}

const PRODUCT_COLUMNS: &str =
    "id, title, product_url, price, source_image_url, image_url, created_at";

const POST_COLUMNS: &str = "id, title, content, excerpt, status, tags, categories, \
     meta_description, target_keyword, auto_generated, generated_at, created_at";

/// Products and posts stored in SQLite.
#[derive(Debug, Clone)]
pub struct SqliteCatalog {
    db: Db,
}

impl SqliteCatalog {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    async fn product_by_url(&self, url: &str) -> Result<Option<ProductItem>, DbError> {
        let sql = format!("SELECT {} FROM products WHERE product_url = ?", PRODUCT_COLUMNS);
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(url)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.map(ProductItem::from))
    }

    async fn insert_product(&self, product: &NewProduct) -> Result<Insertion, DbError> {
        let now = current_timestamp();
        let result = sqlx::query(
            "INSERT INTO products (title, product_url, price, source_image_url, image_url, created_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT(product_url) DO NOTHING",
        )
        .bind(&product.title)
        .bind(&product.product_url)
        .bind(product.price)
        .bind(&product.source_image_url)
        .bind(&product.source_image_url)
        .bind(now)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 1 {
            let id = ProductId::new(result.last_insert_rowid());
            return Ok(Insertion::Created(ProductItem::from_new(id, product, now)));
        }

        // Lost the race or a repeat submission: hand back the stored record.
        match self.product_by_url(&product.product_url).await? {
            Some(existing) => Ok(Insertion::Existing(existing)),
            None => Err(DbError::QueryError(sqlx::Error::RowNotFound)),
        }
    }
}

#[async_trait]
impl ProductRepository for SqliteCatalog {
    async fn find_by_product_url(&self, url: &str) -> Result<Option<ProductItem>, CatalogError> {
        Ok(self.product_by_url(url).await?)
    }

    async fn insert_unique(&self, product: &NewProduct) -> Result<Insertion, CatalogError> {
        Ok(self.insert_product(product).await?)
    }

    async fn set_image_url(&self, id: ProductId, image_url: &str) -> Result<(), CatalogError> {
        let result = sqlx::query("UPDATE products SET image_url = ? WHERE id = ?")
            .bind(image_url)
            .bind(id.get())
            .execute(self.db.pool())
            .await
            .map_err(DbError::from)?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::ProductNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn get(&self, id: ProductId) -> Result<Option<ProductItem>, CatalogError> {
        let sql = format!("SELECT {} FROM products WHERE id = ?", PRODUCT_COLUMNS);
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id.get())
            .fetch_optional(self.db.pool())
            .await
            .map_err(DbError::from)?;
        Ok(row.map(ProductItem::from))
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<ProductItem>, CatalogError> {
        let sql = format!(
            "SELECT {} FROM products ORDER BY id DESC LIMIT ?",
            PRODUCT_COLUMNS
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(self.db.pool())
            .await
            .map_err(DbError::from)?;
        Ok(rows.into_iter().map(ProductItem::from).collect())
    }
}

#[async_trait]
impl PostRepository for SqliteCatalog {
    async fn insert(&self, post: NewBlogPost) -> Result<BlogPost, CatalogError> {
        let now = current_timestamp();
        let result = sqlx::query(
            "INSERT INTO posts (title, content, excerpt, status, tags, categories, \
             meta_description, target_keyword, auto_generated, generated_at, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)",
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.excerpt)
        .bind(post.status.as_str())
        .bind(serde_json::to_string(&post.tags)?)
        .bind(serde_json::to_string(&post.categories)?)
        .bind(&post.meta_description)
        .bind(&post.target_keyword)
        .bind(post.generated_at)
        .bind(now)
        .execute(self.db.pool())
        .await
        .map_err(DbError::from)?;

        let id = PostId::new(result.last_insert_rowid());
        Ok(BlogPost::from_new(id, post, now))
    }

    async fn get(&self, id: PostId) -> Result<Option<BlogPost>, CatalogError> {
        let sql = format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS);
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id.get())
            .fetch_optional(self.db.pool())
            .await
            .map_err(DbError::from)?;
        match row {
            Some(row) => Ok(Some(BlogPost::try_from(row)?)),
            None => Ok(None),
        }
    }

    async fn list_generated(&self, page: PageRequest) -> Result<PostPage, CatalogError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE auto_generated = 1")
            .fetch_one(self.db.pool())
            .await
            .map_err(DbError::from)?;

        let sql = format!(
            "SELECT {} FROM posts WHERE auto_generated = 1 ORDER BY id DESC LIMIT ? OFFSET ?",
            POST_COLUMNS
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(i64::from(page.per_page))
            .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
            .fetch_all(self.db.pool())
            .await
            .map_err(DbError::from)?;

        let posts = rows
            .into_iter()
            .map(BlogPost::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let total = u64::try_from(total).unwrap_or(0);
        Ok(PostPage {
            posts,
            total,
            total_pages: page.total_pages(total),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    async fn catalog() -> SqliteCatalog {
        let db = Db::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        SqliteCatalog::new(db)
    }

    fn product(url: &str, price: i64) -> NewProduct {
        NewProduct {
            title: "QTD 207".to_string(),
            product_url: url.to_string(),
            price,
            source_image_url: "https://yourdoll.jp/img/qtd207.jpg".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_unique_returns_existing() {
        let catalog = catalog().await;
        let created = catalog
            .insert_unique(&product("https://yourdoll.jp/product/qtd207/", 998_000))
            .await
            .unwrap();
        assert!(created.is_created());

        let again = catalog
            .insert_unique(&product("https://yourdoll.jp/product/qtd207/", 10))
            .await
            .unwrap();
        assert!(!again.is_created());
        assert_eq!(again.item().id, created.item().id);
        assert_eq!(again.item().price, 998_000);
        assert_eq!(catalog.list_recent(LIST_LIMIT).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_collapse() {
        let catalog = Arc::new(catalog().await);
        let mut handles = Vec::new();
        for _ in 0..8 {
            let catalog = catalog.clone();
            handles.push(tokio::spawn(async move {
                catalog
                    .insert_unique(&product("https://example.com/p/race", 5_000))
                    .await
                    .unwrap()
            }));
        }
        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_created() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn test_set_image_url_and_get() {
        let catalog = catalog().await;
        let id = catalog
            .insert_unique(&product("https://example.com/p/1", 1_000))
            .await
            .unwrap()
            .into_item()
            .id;
        catalog
            .set_image_url(id, "https://kuuhaku.example/uploads/2026/10/qtd-207.webp")
            .await
            .unwrap();

        let item = ProductRepository::get(&catalog, id).await.unwrap().unwrap();
        assert_eq!(item.image_url, "https://kuuhaku.example/uploads/2026/10/qtd-207.webp");
        assert_eq!(item.source_image_url, "https://yourdoll.jp/img/qtd207.jpg");

        let missing = catalog.set_image_url(ProductId::new(404), "x").await;
        assert!(matches!(missing, Err(CatalogError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_list_recent_newest_first() {
        let catalog = catalog().await;
        for i in 0..3 {
            catalog
                .insert_unique(&product(&format!("https://example.com/p/{}", i), 1_000))
                .await
                .unwrap();
        }
        let items = catalog.list_recent(2).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].product_url, "https://example.com/p/2");
    }

    #[tokio::test]
    async fn test_posts_roundtrip_and_paginate() {
        let catalog = catalog().await;
        for i in 0..3 {
            catalog
                .insert(NewBlogPost {
                    title: format!("post {}", i),
                    content: "body".to_string(),
                    excerpt: None,
                    status: PostStatus::Publish,
                    tags: vec!["比較".to_string()],
                    categories: Vec::new(),
                    meta_description: Some("desc".to_string()),
                    target_keyword: Some("ラブドール".to_string()),
                    generated_at: 7,
                })
                .await
                .unwrap();
        }

        let page = catalog
            .list_generated(PageRequest::new(Some(2), Some(1)))
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.posts[0].title, "post 2");
        assert_eq!(page.posts[0].tags, vec!["比較".to_string()]);
        assert!(page.posts[0].auto_generated);
        assert_eq!(page.posts[0].status, PostStatus::Publish);

        let stored = PostRepository::get(&catalog, page.posts[1].id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.generated_at, Some(7));
    }
}
