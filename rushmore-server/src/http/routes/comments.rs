//! Comment endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::Comment;
use crate::http::error::ApiError;
use crate::http::extractors::{parse_id, Access, AccessLevel, ValidId};
use crate::http::server::AppState;
use crate::models::{CommentContent, CommentLimit, CommentSort};

/// Create/update comment request
#[derive(Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub content: String,
}

/// `?postId=&limit=&sort=`
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CommentListParams {
    pub post_id: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
}

/// Comment response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: i32,
    pub content: String,
    pub likes: i32,
    pub created_at: String,
    pub post_id: i32,
}

impl From<Comment> for CommentResponse {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            content: c.content,
            likes: c.likes,
            created_at: c.created_at.to_rfc3339(),
            post_id: c.post_id,
        }
    }
}

/// Like result
#[derive(Serialize)]
pub struct LikeResponse {
    pub success: bool,
    pub likes: i32,
}

/// GET /comments?postId&limit&sort - list comments on a post
async fn list_comments(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CommentListParams>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let raw_post_id = params
        .post_id
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or(ApiError::MissingParameter {
            message: "Post ID is required",
        })?;
    let post_id = parse_id("postId", raw_post_id)?;

    let sort = CommentSort::from_param(params.sort.as_deref());
    let limit = CommentLimit::from_param(params.limit.as_deref());

    tracing::debug!(post_id, sort = sort.as_str(), limit = limit.get(), "Listing comments");
    let comments = state.store.list_comments(post_id, sort, limit).await?;
    Ok(Json(comments.into_iter().map(CommentResponse::from).collect()))
}

/// GET /comments/{id} - get a single comment
async fn get_comment(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<Json<CommentResponse>, ApiError> {
    let comment = state.store.get_comment(id).await?;
    Ok(Json(CommentResponse::from(comment)))
}

/// POST /comments/{id}/like - increment the likes counter
async fn like_comment(
    State(state): State<Arc<AppState>>,
    access: Access,
    ValidId(id): ValidId,
) -> Result<Json<LikeResponse>, ApiError> {
    access.require(AccessLevel::Anonymous)?;

    let likes = state.store.like_comment(id).await?;
    tracing::debug!(comment_id = id, likes, "Comment liked");

    Ok(Json(LikeResponse {
        success: true,
        likes,
    }))
}

/// POST /posts/{id}/comments - add a comment to a post
async fn create_comment(
    State(state): State<Arc<AppState>>,
    access: Access,
    ValidId(post_id): ValidId,
    Json(req): Json<CommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    access.require(AccessLevel::Anonymous)?;
    let content = CommentContent::new(&req.content)?;

    let comment = state.store.create_comment(post_id, &content).await?;
    tracing::info!(post_id, comment_id = comment.id, "Comment created");

    Ok((StatusCode::CREATED, Json(CommentResponse::from(comment))))
}

/// PUT /posts/{id}/comments/{comment_id} - edit a comment
///
/// A comment that belongs to a different post is reported as not found.
async fn update_comment(
    State(state): State<Arc<AppState>>,
    access: Access,
    Path((raw_post_id, raw_comment_id)): Path<(String, String)>,
    Json(req): Json<CommentRequest>,
) -> Result<Json<CommentResponse>, ApiError> {
    access.require(AccessLevel::Anonymous)?;
    let post_id = parse_id("id", &raw_post_id)?;
    let comment_id = parse_id("commentId", &raw_comment_id)?;
    let content = CommentContent::new(&req.content)?;

    let existing = state.store.get_comment(comment_id).await?;
    if existing.post_id != post_id {
        return Err(ApiError::NotFound {
            resource: "comment",
            id: comment_id.to_string(),
        });
    }

    let updated = state.store.update_comment(comment_id, &content).await?;
    tracing::info!(post_id, comment_id, "Comment updated");

    Ok(Json(CommentResponse::from(updated)))
}

/// Comment routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/comments", get(list_comments))
        .route("/comments/{id}", get(get_comment))
        .route("/comments/{id}/like", post(like_comment))
        .route("/posts/{id}/comments", post(create_comment))
        .route("/posts/{id}/comments/{comment_id}", put(update_comment))
}
