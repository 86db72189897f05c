//! Automatically generated blog posts.

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::ids::PostId;
use crate::product::sanitize_text;

/// Publication status of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Saved but not visible.
    #[default]
    Draft,
    /// Publicly visible.
    Publish,
    /// Waiting for review.
    Pending,
    /// Visible to editors only.
    Private,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Publish => "publish",
            PostStatus::Pending => "pending",
            PostStatus::Private => "private",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Some(PostStatus::Draft),
            "publish" => Some(PostStatus::Publish),
            "pending" => Some(PostStatus::Pending),
            "private" => Some(PostStatus::Private),
            _ => None,
        }
    }
}

/// Request body for creating a generated post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlogPostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// Unknown values fall back to draft.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    /// Keyword the post was generated for.
    #[serde(default)]
    pub keyword: Option<String>,
}

impl BlogPostRequest {
    /// Validate the request into a post ready for storage.
    pub fn validate(self, generated_at: i64) -> Result<NewBlogPost, CatalogError> {
        let title = self.title.as_deref().map(sanitize_text).unwrap_or_default();
        let content = self
            .content
            .map(|c| c.trim().to_string())
            .unwrap_or_default();
        if title.is_empty() || content.is_empty() {
            return Err(CatalogError::InvalidParams(
                "title and content are required".to_string(),
            ));
        }

        let status = self
            .status
            .as_deref()
            .and_then(PostStatus::from_str)
            .unwrap_or_default();

        Ok(NewBlogPost {
            title,
            content,
            excerpt: non_empty(self.excerpt.as_deref().map(sanitize_text)),
            status,
            tags: clean_terms(self.tags),
            categories: clean_terms(self.categories),
            meta_description: non_empty(self.meta_description.as_deref().map(sanitize_text)),
            target_keyword: non_empty(self.keyword.as_deref().map(sanitize_text)),
            generated_at,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn clean_terms(terms: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(terms.len());
    for term in terms {
        let term = sanitize_text(&term);
        if !term.is_empty() && !out.contains(&term) {
            out.push(term);
        }
    }
    out
}

/// A validated post ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBlogPost {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub status: PostStatus,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub meta_description: Option<String>,
    pub target_keyword: Option<String>,
    /// Unix timestamp of generation.
    pub generated_at: i64,
}

/// A stored blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub status: PostStatus,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub meta_description: Option<String>,
    pub target_keyword: Option<String>,
    /// Set for posts created through the generation endpoint.
    pub auto_generated: bool,
    pub generated_at: Option<i64>,
    /// Unix timestamp of creation.
    pub created_at: i64,
}

impl BlogPost {
    /// Build a stored post from a new post and its assigned id.
    pub fn from_new(id: PostId, post: NewBlogPost, created_at: i64) -> Self {
        Self {
            id,
            title: post.title,
            content: post.content,
            excerpt: post.excerpt,
            status: post.status,
            tags: post.tags,
            categories: post.categories,
            meta_description: post.meta_description,
            target_keyword: post.target_keyword,
            auto_generated: true,
            generated_at: Some(post.generated_at),
            created_at,
        }
    }

    /// Public link to the post.
    ///
    /// Published posts use the pretty archive path; anything else uses the
    /// query-string form, which resolves for logged-in editors only.
    pub fn permalink(&self, site_url: &str) -> String {
        let base = site_url.trim_end_matches('/');
        match self.status {
            PostStatus::Publish => format!("{}/archives/{}/", base, self.id),
            _ => format!("{}/?p={}", base, self.id),
        }
    }
}
