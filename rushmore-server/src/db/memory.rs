//! In-process store
//!
//! Mirrors the PostgreSQL schema rules: comments cascade with their post,
//! posts lose their category when it is deleted, likes start at zero.
//! Backs the router tests and `rushmore serve --memory`.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use super::seed::SAMPLE_CATEGORIES;
use super::store::{
    BlogStore, Category, CategoryWithCount, Comment, DbError, Post, PostDetail, PostSummary,
};
use crate::models::{CommentContent, CommentLimit, CommentSort, NewCategory, NewPost, PostOrder};

#[derive(Default)]
struct Tables {
    categories: BTreeMap<i32, Category>,
    posts: BTreeMap<i32, Post>,
    comments: BTreeMap<i32, Comment>,
    next_id: i32,
    last_timestamp: Option<DateTime<Utc>>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    /// Strictly increasing timestamps so creation order is total.
    fn now(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_timestamp {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_timestamp = Some(now);
        now
    }

    fn summary(&self, post: &Post) -> PostSummary {
        PostSummary {
            id: post.id,
            title: post.title.clone(),
            author: post.author.clone(),
            created_at: post.created_at,
            category_id: post.category_id,
            category_name: post
                .category_id
                .and_then(|id| self.categories.get(&id))
                .map(|c| c.name.clone()),
            comment_count: self
                .comments
                .values()
                .filter(|c| c.post_id == post.id)
                .count() as i64,
        }
    }

    fn summaries<'a>(
        &self,
        posts: impl Iterator<Item = &'a Post>,
        order: PostOrder,
    ) -> Vec<PostSummary> {
        let mut out: Vec<_> = posts.map(|p| self.summary(p)).collect();
        out.sort_by_key(|p| (p.created_at, p.id));
        if !order.is_ascending() {
            out.reverse();
        }
        out
    }

    fn with_count(&self, category: &Category) -> CategoryWithCount {
        CategoryWithCount {
            id: category.id,
            name: category.name.clone(),
            description: category.description.clone(),
            post_count: self
                .posts
                .values()
                .filter(|p| p.category_id == Some(category.id))
                .count() as i64,
        }
    }

    fn check_category(&self, category_id: Option<i32>) -> Result<(), DbError> {
        match category_id {
            Some(id) if !self.categories.contains_key(&id) => {
                Err(DbError::not_found("category", id))
            }
            _ => Ok(()),
        }
    }
}

/// Blog store held in memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with the sample categories.
    pub fn with_sample_categories() -> Self {
        let mut tables = Tables::default();
        for (name, description) in SAMPLE_CATEGORIES {
            let id = tables.next_id();
            tables.categories.insert(
                id,
                Category {
                    id,
                    name: (*name).to_owned(),
                    description: Some((*description).to_owned()),
                },
            );
        }

        Self {
            tables: Arc::new(RwLock::new(tables)),
        }
    }
}

#[async_trait]
impl BlogStore for MemoryStore {
    async fn list_posts(&self, order: PostOrder) -> Result<Vec<PostSummary>, DbError> {
        let t = self.tables.read().await;
        Ok(t.summaries(t.posts.values(), order))
    }

    async fn latest_posts(&self, limit: u32) -> Result<Vec<PostSummary>, DbError> {
        let t = self.tables.read().await;
        let mut posts = t.summaries(t.posts.values(), PostOrder::Desc);
        posts.truncate(limit as usize);
        Ok(posts)
    }

    async fn get_post(&self, id: i32) -> Result<PostDetail, DbError> {
        let t = self.tables.read().await;
        let post = t
            .posts
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::not_found("post", id))?;
        let category = post
            .category_id
            .and_then(|cid| t.categories.get(&cid))
            .cloned();
        Ok(PostDetail { post, category })
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post, DbError> {
        let mut t = self.tables.write().await;
        t.check_category(post.category_id)?;

        let created = Post {
            id: t.next_id(),
            title: post.title.as_str().to_owned(),
            content: post.content.as_str().to_owned(),
            author: post.author.as_str().to_owned(),
            created_at: t.now(),
            category_id: post.category_id,
        };
        t.posts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_post(&self, id: i32, post: &NewPost) -> Result<Post, DbError> {
        let mut t = self.tables.write().await;
        if !t.posts.contains_key(&id) {
            return Err(DbError::not_found("post", id));
        }
        t.check_category(post.category_id)?;

        let existing = t
            .posts
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found("post", id))?;
        existing.title = post.title.as_str().to_owned();
        existing.content = post.content.as_str().to_owned();
        existing.author = post.author.as_str().to_owned();
        existing.category_id = post.category_id;
        Ok(existing.clone())
    }

    async fn delete_post(&self, id: i32) -> Result<(), DbError> {
        let mut t = self.tables.write().await;
        if t.posts.remove(&id).is_none() {
            return Err(DbError::not_found("post", id));
        }
        t.comments.retain(|_, c| c.post_id != id);
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<CategoryWithCount>, DbError> {
        let t = self.tables.read().await;
        let mut categories: Vec<_> = t.categories.values().map(|c| t.with_count(c)).collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(categories)
    }

    async fn featured_categories(&self, limit: u32) -> Result<Vec<CategoryWithCount>, DbError> {
        let t = self.tables.read().await;
        // BTreeMap iterates in id order
        Ok(t.categories
            .values()
            .take(limit as usize)
            .map(|c| t.with_count(c))
            .collect())
    }

    async fn get_category(&self, id: i32) -> Result<Category, DbError> {
        let t = self.tables.read().await;
        t.categories
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::not_found("category", id))
    }

    async fn create_category(&self, category: &NewCategory) -> Result<Category, DbError> {
        let mut t = self.tables.write().await;
        let created = Category {
            id: t.next_id(),
            name: category.name.as_str().to_owned(),
            description: category.description.clone(),
        };
        t.categories.insert(created.id, created.clone());
        Ok(created)
    }

    async fn delete_category(&self, id: i32) -> Result<(), DbError> {
        let mut t = self.tables.write().await;
        if t.categories.remove(&id).is_none() {
            return Err(DbError::not_found("category", id));
        }
        for post in t.posts.values_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
        Ok(())
    }

    async fn posts_in_category(
        &self,
        category_id: i32,
        order: PostOrder,
    ) -> Result<Vec<PostSummary>, DbError> {
        let t = self.tables.read().await;
        if !t.categories.contains_key(&category_id) {
            return Err(DbError::not_found("category", category_id));
        }
        let posts = t
            .posts
            .values()
            .filter(|p| p.category_id == Some(category_id));
        Ok(t.summaries(posts, order))
    }

    async fn list_comments(
        &self,
        post_id: i32,
        sort: CommentSort,
        limit: CommentLimit,
    ) -> Result<Vec<Comment>, DbError> {
        let t = self.tables.read().await;
        let mut comments: Vec<_> = t
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();

        match sort {
            CommentSort::Newest => {
                comments.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)))
            }
            CommentSort::Oldest => comments.sort_by_key(|c| (c.created_at, c.id)),
            CommentSort::Likes => comments.sort_by(|a, b| (b.likes, b.id).cmp(&(a.likes, a.id))),
        }

        comments.truncate(limit.get() as usize);
        Ok(comments)
    }

    async fn get_comment(&self, id: i32) -> Result<Comment, DbError> {
        let t = self.tables.read().await;
        t.comments
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::not_found("comment", id))
    }

    async fn create_comment(
        &self,
        post_id: i32,
        content: &CommentContent,
    ) -> Result<Comment, DbError> {
        let mut t = self.tables.write().await;
        if !t.posts.contains_key(&post_id) {
            return Err(DbError::not_found("post", post_id));
        }

        let comment = Comment {
            id: t.next_id(),
            content: content.as_str().to_owned(),
            likes: 0,
            created_at: t.now(),
            post_id,
        };
        t.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update_comment(
        &self,
        id: i32,
        content: &CommentContent,
    ) -> Result<Comment, DbError> {
        let mut t = self.tables.write().await;
        let comment = t
            .comments
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found("comment", id))?;
        comment.content = content.as_str().to_owned();
        Ok(comment.clone())
    }

    async fn like_comment(&self, id: i32) -> Result<i32, DbError> {
        let mut t = self.tables.write().await;
        let comment = t
            .comments
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found("comment", id))?;
        comment.likes = comment
            .likes
            .checked_add(1)
            .ok_or_else(|| DbError::CounterOverflow {
                resource: "comment",
                id: id.to_string(),
            })?;
        Ok(comment.likes)
    }
}
