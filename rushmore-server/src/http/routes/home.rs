//! Home page data: latest posts and featured categories

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::categories::CategoryResponse;
use super::posts::PostSummaryResponse;
use crate::http::server::AppState;

const LATEST_POSTS: u32 = 3;
const FEATURED_CATEGORIES: u32 = 4;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeResponse {
    pub latest_posts: Vec<PostSummaryResponse>,
    pub featured_categories: Vec<CategoryResponse>,
}

/// GET /home
///
/// Store failures degrade to empty lists so the landing page still
/// renders before the database is set up.
async fn home(State(state): State<Arc<AppState>>) -> Json<HomeResponse> {
    let latest_posts = match state.store.latest_posts(LATEST_POSTS).await {
        Ok(posts) => posts.into_iter().map(PostSummaryResponse::from).collect(),
        Err(e) => {
            tracing::warn!("Failed to load latest posts: {}", e);
            Vec::new()
        }
    };

    let featured_categories = match state.store.featured_categories(FEATURED_CATEGORIES).await {
        Ok(categories) => categories
            .into_iter()
            .map(CategoryResponse::from)
            .collect(),
        Err(e) => {
            tracing::warn!("Failed to load featured categories: {}", e);
            Vec::new()
        }
    };

    Json(HomeResponse {
        latest_posts,
        featured_categories,
    })
}

/// Home routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/home", get(home))
}
