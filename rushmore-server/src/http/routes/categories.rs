//! Category endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::posts::{DeleteResponse, PostListParams, PostSummaryResponse};
use crate::db::{Category, CategoryWithCount};
use crate::http::error::ApiError;
use crate::http::extractors::{Access, AccessLevel, ValidId};
use crate::http::server::AppState;
use crate::models::{NewCategory, PostOrder};

/// Create category request
#[derive(Deserialize)]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
}

/// Category response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_count: Option<i64>,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            post_count: None,
        }
    }
}

impl From<CategoryWithCount> for CategoryResponse {
    fn from(c: CategoryWithCount) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            post_count: Some(c.post_count),
        }
    }
}

/// Category with its posts
#[derive(Serialize)]
pub struct CategoryDetailResponse {
    pub category: CategoryResponse,
    pub posts: Vec<PostSummaryResponse>,
}

/// GET /categories - list categories by name with post counts
async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let categories = state.store.list_categories().await?;
    Ok(Json(
        categories.into_iter().map(CategoryResponse::from).collect(),
    ))
}

/// POST /categories - create a category
async fn create_category(
    State(state): State<Arc<AppState>>,
    access: Access,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    access.require(AccessLevel::ServiceRole)?;
    let category = NewCategory::new(&req.name, req.description.as_deref())?;

    let created = state.store.create_category(&category).await?;
    tracing::info!(category_id = created.id, name = %created.name, "Category created");

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(created))))
}

/// GET /categories/{id}?sort=asc|desc - category with its posts
async fn get_category(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
    Query(params): Query<PostListParams>,
) -> Result<Json<CategoryDetailResponse>, ApiError> {
    let order = PostOrder::from_param(params.sort.as_deref());

    let category = state.store.get_category(id).await?;
    let posts = state.store.posts_in_category(id, order).await?;
    let post_count = posts.len() as i64;

    Ok(Json(CategoryDetailResponse {
        category: CategoryResponse {
            post_count: Some(post_count),
            ..CategoryResponse::from(category)
        },
        posts: posts.into_iter().map(PostSummaryResponse::from).collect(),
    }))
}

/// DELETE /categories/{id} - delete a category; its posts become uncategorised
async fn delete_category(
    State(state): State<Arc<AppState>>,
    access: Access,
    ValidId(id): ValidId,
) -> Result<Json<DeleteResponse>, ApiError> {
    access.require(AccessLevel::ServiceRole)?;

    state.store.delete_category(id).await?;
    tracing::info!(category_id = id, "Category deleted");

    Ok(Json(DeleteResponse { success: true }))
}

/// Category routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category).delete(delete_category),
        )
}
