//! Store trait and records
//!
//! Handlers talk to storage only through [`BlogStore`], so the same
//! routes run against PostgreSQL ([`super::PgStore`]) or the in-process
//! [`super::MemoryStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::models::{CommentContent, CommentLimit, CommentSort, NewCategory, NewPost, PostOrder};

/// Post record from database
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub category_id: Option<i32>,
}

/// Post with category name and comment count for list display
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct PostSummary {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub category_id: Option<i32>,
    pub category_name: Option<String>,
    pub comment_count: i64,
}

/// Post with its category resolved
#[derive(Debug, Clone, PartialEq)]
pub struct PostDetail {
    pub post: Post,
    pub category: Option<Category>,
}

/// Category record from database
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

/// Category with the number of posts referencing it
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CategoryWithCount {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub post_count: i64,
}

/// Comment record from database
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Comment {
    pub id: i32,
    pub content: String,
    pub likes: i32,
    pub created_at: DateTime<Utc>,
    pub post_id: i32,
}

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("counter overflow on {resource} '{id}'")]
    CounterOverflow { resource: &'static str, id: String },
}

impl DbError {
    pub(crate) fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

/// Row-oriented blog storage.
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// All posts with category name and comment count.
    async fn list_posts(&self, order: PostOrder) -> Result<Vec<PostSummary>, DbError>;

    /// The `limit` most recent posts.
    async fn latest_posts(&self, limit: u32) -> Result<Vec<PostSummary>, DbError>;

    async fn get_post(&self, id: i32) -> Result<PostDetail, DbError>;

    /// Insert a post. An unknown category is `NotFound { resource: "category" }`.
    async fn create_post(&self, post: &NewPost) -> Result<Post, DbError>;

    /// Replace title, content, author, and category of an existing post.
    async fn update_post(&self, id: i32, post: &NewPost) -> Result<Post, DbError>;

    /// Delete a post and its comments atomically.
    async fn delete_post(&self, id: i32) -> Result<(), DbError>;

    /// All categories ordered by name, with post counts.
    async fn list_categories(&self) -> Result<Vec<CategoryWithCount>, DbError>;

    /// The first `limit` categories by id, with post counts.
    async fn featured_categories(&self, limit: u32) -> Result<Vec<CategoryWithCount>, DbError>;

    async fn get_category(&self, id: i32) -> Result<Category, DbError>;

    async fn create_category(&self, category: &NewCategory) -> Result<Category, DbError>;

    /// Delete a category. Posts referencing it become uncategorised.
    async fn delete_category(&self, id: i32) -> Result<(), DbError>;

    /// Posts in a category. A missing category is `NotFound`.
    async fn posts_in_category(
        &self,
        category_id: i32,
        order: PostOrder,
    ) -> Result<Vec<PostSummary>, DbError>;

    /// Comments on a post, ordered by `sort` with ties broken by id.
    async fn list_comments(
        &self,
        post_id: i32,
        sort: CommentSort,
        limit: CommentLimit,
    ) -> Result<Vec<Comment>, DbError>;

    async fn get_comment(&self, id: i32) -> Result<Comment, DbError>;

    /// Add a comment with zero likes. An unknown post is `NotFound { resource: "post" }`.
    async fn create_comment(
        &self,
        post_id: i32,
        content: &CommentContent,
    ) -> Result<Comment, DbError>;

    async fn update_comment(&self, id: i32, content: &CommentContent)
        -> Result<Comment, DbError>;

    /// Increment the likes counter in one step and return the new value.
    ///
    /// A counter already at `i32::MAX` is left unchanged and reported as
    /// `CounterOverflow`.
    async fn like_comment(&self, id: i32) -> Result<i32, DbError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = DbError::not_found("comment", 42);
        assert_eq!(err.to_string(), "not found: comment '42'");
    }
}
