//! Generated blog posts.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kuuhaku_catalog::prelude::*;
use kuuhaku_catalog::product::sanitize_text;

/// Length of excerpts derived from post content, in characters.
const DERIVED_EXCERPT_CHARS: usize = 110;

/// Response for a created post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPost {
    pub success: bool,
    pub post_id: PostId,
    pub permalink: String,
    pub title: String,
    pub status: PostStatus,
}

/// One entry of the generated-post listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: PostId,
    pub title: String,
    pub excerpt: String,
    pub permalink: String,
    /// RFC 3339 creation time.
    pub date: String,
    pub status: PostStatus,
    pub target_keyword: Option<String>,
    /// RFC 3339 generation time.
    pub generated_at: Option<String>,
}

/// One page of the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostList {
    pub posts: Vec<PostSummary>,
    pub total: u64,
    pub total_pages: u64,
}

/// Creates and lists generated posts.
#[derive(Clone)]
pub struct BlogService {
    posts: Arc<dyn PostRepository>,
    site_url: String,
}

impl BlogService {
    pub fn new(posts: Arc<dyn PostRepository>, site_url: impl Into<String>) -> Self {
        Self {
            posts,
            site_url: site_url.into(),
        }
    }

    pub async fn create(&self, request: BlogPostRequest) -> Result<CreatedPost, CatalogError> {
        let new_post = request.validate(Utc::now().timestamp())?;
        let post = self.posts.insert(new_post).await?;
        tracing::info!(id = %post.id, status = post.status.as_str(), "blog post created");
        Ok(CreatedPost {
            success: true,
            post_id: post.id,
            permalink: post.permalink(&self.site_url),
            title: post.title,
            status: post.status,
        })
    }

    pub async fn list(&self, page: PageRequest) -> Result<PostList, CatalogError> {
        let page = self.posts.list_generated(page).await?;
        Ok(PostList {
            posts: page.posts.iter().map(|p| self.summary(p)).collect(),
            total: page.total,
            total_pages: page.total_pages,
        })
    }

    fn summary(&self, post: &BlogPost) -> PostSummary {
        PostSummary {
            id: post.id,
            title: post.title.clone(),
            excerpt: post
                .excerpt
                .clone()
                .unwrap_or_else(|| derive_excerpt(&post.content)),
            permalink: post.permalink(&self.site_url),
            date: rfc3339(post.created_at).unwrap_or_default(),
            status: post.status,
            target_keyword: post.target_keyword.clone(),
            generated_at: post.generated_at.and_then(rfc3339),
        }
    }
}

impl std::fmt::Debug for BlogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlogService")
            .field("site_url", &self.site_url)
            .finish_non_exhaustive()
    }
}

fn rfc3339(timestamp: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(timestamp, 0).map(|t| t.to_rfc3339())
}

fn derive_excerpt(content: &str) -> String {
    let text = sanitize_text(content);
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(DERIVED_EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}
