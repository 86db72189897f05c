//! Generated blog-post handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use kuuhaku_catalog::post::BlogPostRequest;
use kuuhaku_catalog::repository::PageRequest;

use crate::blog::{CreatedPost, PostList};
use crate::error::ApiError;
use crate::extract::JsonOrForm;
use crate::state::AppState;

/// Query string of `GET /blog-posts`. Unparseable numbers fall back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct BlogPostQuery {
    pub per_page: Option<String>,
    pub page: Option<String>,
}

impl BlogPostQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(parse_number(&self.per_page), parse_number(&self.page))
    }
}

fn parse_number(value: &Option<String>) -> Option<u32> {
    value.as_deref().and_then(|v| v.trim().parse().ok())
}

/// `POST /create-blog-post`
pub async fn create_blog_post(
    State(state): State<AppState>,
    JsonOrForm(request): JsonOrForm<BlogPostRequest>,
) -> Result<(StatusCode, Json<CreatedPost>), ApiError> {
    let created = state.blog.create(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /blog-posts`
pub async fn list_blog_posts(
    State(state): State<AppState>,
    Query(query): Query<BlogPostQuery>,
) -> Result<Json<PostList>, ApiError> {
    Ok(Json(state.blog.list(query.page_request()).await?))
}
