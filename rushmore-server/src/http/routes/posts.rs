//! Post endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::{Post, PostDetail, PostSummary};
use crate::http::error::ApiError;
use crate::http::extractors::{Access, AccessLevel, ValidId};
use crate::http::server::AppState;
use crate::models::{paragraphs, CategoryRef, NewPost, PostOrder};

/// Label shown for posts without a category
pub const UNCATEGORISED: &str = "Uncategorised";

/// Create/update post request.
///
/// Missing strings deserialize as empty so they surface as validation
/// errors rather than JSON rejections.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: String,
    pub category_id: Option<CategoryRef>,
}

impl PostRequest {
    fn validate(&self) -> Result<NewPost, ApiError> {
        Ok(NewPost::new(
            &self.title,
            &self.content,
            &self.author,
            self.category_id.as_ref(),
        )?)
    }
}

/// `?sort=asc|desc`
#[derive(Deserialize, Default)]
pub struct PostListParams {
    pub sort: Option<String>,
}

/// Post row in lists
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummaryResponse {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub created_at: String,
    pub category_id: Option<i32>,
    pub category_name: String,
    pub comment_count: i64,
}

impl From<PostSummary> for PostSummaryResponse {
    fn from(p: PostSummary) -> Self {
        Self {
            id: p.id,
            title: p.title,
            author: p.author,
            created_at: p.created_at.to_rfc3339(),
            category_id: p.category_id,
            category_name: p.category_name.unwrap_or_else(|| UNCATEGORISED.to_owned()),
            comment_count: p.comment_count,
        }
    }
}

/// Full post
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: String,
    pub category_id: Option<i32>,
}

impl From<Post> for PostResponse {
    fn from(p: Post) -> Self {
        Self {
            id: p.id,
            title: p.title,
            content: p.content,
            author: p.author,
            created_at: p.created_at.to_rfc3339(),
            category_id: p.category_id,
        }
    }
}

/// Category reference embedded in a post
#[derive(Serialize)]
pub struct PostCategory {
    pub id: i32,
    pub name: String,
}

/// Post with its category resolved and its body split for display
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    pub category: Option<PostCategory>,
    pub category_name: String,
    pub paragraphs: Vec<String>,
}

impl From<PostDetail> for PostDetailResponse {
    fn from(d: PostDetail) -> Self {
        let category = d.category.map(|c| PostCategory {
            id: c.id,
            name: c.name,
        });
        let category_name = category
            .as_ref()
            .map(|c| c.name.clone())
            .unwrap_or_else(|| UNCATEGORISED.to_owned());

        let split = paragraphs(&d.post.content).map(str::to_owned).collect();

        Self {
            post: PostResponse::from(d.post),
            category,
            category_name,
            paragraphs: split,
        }
    }
}

/// GET /posts - list posts with category name and comment count
async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PostListParams>,
) -> Result<Json<Vec<PostSummaryResponse>>, ApiError> {
    let order = PostOrder::from_param(params.sort.as_deref());
    let posts = state.store.list_posts(order).await?;

    Ok(Json(posts.into_iter().map(PostSummaryResponse::from).collect()))
}

/// POST /posts - create a post
async fn create_post(
    State(state): State<Arc<AppState>>,
    access: Access,
    Json(req): Json<PostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    access.require(AccessLevel::Anonymous)?;
    let post = req.validate()?;

    let created = state.store.create_post(&post).await?;
    tracing::info!(post_id = created.id, author = %created.author, "Post created");

    Ok((StatusCode::CREATED, Json(PostResponse::from(created))))
}

/// GET /posts/{id} - get a single post with its category
async fn get_post(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<Json<PostDetailResponse>, ApiError> {
    let post = state.store.get_post(id).await?;
    Ok(Json(PostDetailResponse::from(post)))
}

/// PUT /posts/{id} - replace a post's fields
async fn update_post(
    State(state): State<Arc<AppState>>,
    access: Access,
    ValidId(id): ValidId,
    Json(req): Json<PostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    access.require(AccessLevel::Anonymous)?;
    let post = req.validate()?;

    let updated = state.store.update_post(id, &post).await?;
    tracing::info!(post_id = id, "Post updated");

    Ok(Json(PostResponse::from(updated)))
}

/// Deletion result
#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// DELETE /posts/{id} - delete a post and its comments
async fn delete_post(
    State(state): State<Arc<AppState>>,
    access: Access,
    ValidId(id): ValidId,
) -> Result<Json<DeleteResponse>, ApiError> {
    access.require(AccessLevel::ServiceRole)?;

    state.store.delete_post(id).await?;
    tracing::info!(post_id = id, "Post deleted");

    Ok(Json(DeleteResponse { success: true }))
}

/// Post routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
}
