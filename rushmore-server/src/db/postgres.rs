//! PostgreSQL store
//!
//! - Lists: LEFT JOINs with COUNT for comment/post counts (no N+1)
//! - Inserts: foreign-key violations map to NotFound of the referenced row
//! - Like increment: single UPDATE ... RETURNING (no read-modify-write)

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use super::store::{
    BlogStore, Category, CategoryWithCount, Comment, DbError, Post, PostDetail, PostSummary,
};
use crate::models::{CommentContent, CommentLimit, CommentSort, NewCategory, NewPost, PostOrder};

/// Postgres `foreign_key_violation`
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Postgres `numeric_value_out_of_range`
const NUMERIC_OUT_OF_RANGE: &str = "22003";

const POST_COLUMNS: &str = "id, title, content, author, created_at, category_id";
const COMMENT_COLUMNS: &str = "id, content, likes, created_at, post_id";

/// Row filter for post summary queries
enum PostFilter {
    All,
    Category,
}

/// Build the post summary query.
///
/// Interpolated fragments come from enums, never from user input.
fn post_summary_sql(filter: PostFilter, order: PostOrder, limited: bool) -> String {
    let direction = if order.is_ascending() { "ASC" } else { "DESC" };

    let mut sql = String::from(
        r#"
        SELECT
            p.id,
            p.title,
            p.author,
            p.created_at,
            p.category_id,
            c.name AS category_name,
            COUNT(com.id) AS comment_count
        FROM posts p
        LEFT JOIN categories c ON c.id = p.category_id
        LEFT JOIN comments com ON com.post_id = p.id
        "#,
    );

    if let PostFilter::Category = filter {
        sql.push_str("WHERE p.category_id = $1\n");
    }

    sql.push_str(&format!(
        "GROUP BY p.id, c.name\nORDER BY p.created_at {direction}, p.id {direction}\n"
    ));

    if limited {
        let param = match filter {
            PostFilter::All => "$1",
            PostFilter::Category => "$2",
        };
        sql.push_str(&format!("LIMIT {param}\n"));
    }

    sql
}

fn comment_list_sql(sort: CommentSort) -> String {
    let order_by = match sort {
        CommentSort::Newest => "created_at DESC, id DESC",
        CommentSort::Oldest => "created_at ASC, id ASC",
        CommentSort::Likes => "likes DESC, id DESC",
    };

    format!(
        "SELECT {COMMENT_COLUMNS} FROM comments WHERE post_id = $1 ORDER BY {order_by} LIMIT $2"
    )
}

fn has_code(err: &sqlx::Error, expected: &str) -> bool {
    err.as_database_error()
        .and_then(|e| e.code())
        .is_some_and(|code| code == expected)
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    has_code(err, FOREIGN_KEY_VIOLATION)
}

/// Post joined with its category columns
#[derive(FromRow)]
struct PostDetailRow {
    id: i32,
    title: String,
    content: String,
    author: String,
    created_at: chrono::DateTime<chrono::Utc>,
    category_id: Option<i32>,
    category_name: Option<String>,
    category_description: Option<String>,
}

impl From<PostDetailRow> for PostDetail {
    fn from(r: PostDetailRow) -> Self {
        let category = match (r.category_id, r.category_name) {
            (Some(id), Some(name)) => Some(Category {
                id,
                name,
                description: r.category_description,
            }),
            _ => None,
        };

        Self {
            post: Post {
                id: r.id,
                title: r.title,
                content: r.content,
                author: r.author,
                created_at: r.created_at,
                category_id: r.category_id,
            },
            category,
        }
    }
}

/// Blog store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlogStore for PgStore {
    async fn list_posts(&self, order: PostOrder) -> Result<Vec<PostSummary>, DbError> {
        let posts = sqlx::query_as(&post_summary_sql(PostFilter::All, order, false))
            .fetch_all(&self.pool)
            .await?;
        Ok(posts)
    }

    async fn latest_posts(&self, limit: u32) -> Result<Vec<PostSummary>, DbError> {
        let posts = sqlx::query_as(&post_summary_sql(PostFilter::All, PostOrder::Desc, true))
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(posts)
    }

    async fn get_post(&self, id: i32) -> Result<PostDetail, DbError> {
        let row: PostDetailRow = sqlx::query_as(
            r#"
            SELECT
                p.id,
                p.title,
                p.content,
                p.author,
                p.created_at,
                p.category_id,
                c.name AS category_name,
                c.description AS category_description
            FROM posts p
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("post", id))?;

        Ok(row.into())
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post, DbError> {
        let result = sqlx::query_as(&format!(
            r#"
            INSERT INTO posts (title, content, author, category_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(post.title.as_str())
        .bind(post.content.as_str())
        .bind(post.author.as_str())
        .bind(post.category_id)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(created) => Ok(created),
            Err(e) if is_foreign_key_violation(&e) => Err(DbError::not_found(
                "category",
                post.category_id.unwrap_or_default(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_post(&self, id: i32, post: &NewPost) -> Result<Post, DbError> {
        let result = sqlx::query_as(&format!(
            r#"
            UPDATE posts
            SET title = $1, content = $2, author = $3, category_id = $4
            WHERE id = $5
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(post.title.as_str())
        .bind(post.content.as_str())
        .bind(post.author.as_str())
        .bind(post.category_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(Some(updated)) => Ok(updated),
            Ok(None) => Err(DbError::not_found("post", id)),
            Err(e) if is_foreign_key_violation(&e) => Err(DbError::not_found(
                "category",
                post.category_id.unwrap_or_default(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_post(&self, id: i32) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        // Also covers schemas created without ON DELETE CASCADE
        let comments = sqlx::query("DELETE FROM comments WHERE post_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            // Dropping the transaction rolls back
            return Err(DbError::not_found("post", id));
        }

        tx.commit().await?;
        tracing::debug!(post_id = id, comments, "Deleted post and comments");
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<CategoryWithCount>, DbError> {
        let categories = sqlx::query_as(
            r#"
            SELECT c.id, c.name, c.description, COUNT(p.id) AS post_count
            FROM categories c
            LEFT JOIN posts p ON p.category_id = c.id
            GROUP BY c.id
            ORDER BY c.name ASC, c.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn featured_categories(&self, limit: u32) -> Result<Vec<CategoryWithCount>, DbError> {
        let categories = sqlx::query_as(
            r#"
            SELECT c.id, c.name, c.description, COUNT(p.id) AS post_count
            FROM categories c
            LEFT JOIN posts p ON p.category_id = c.id
            GROUP BY c.id
            ORDER BY c.id ASC
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn get_category(&self, id: i32) -> Result<Category, DbError> {
        sqlx::query_as("SELECT id, name, description FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("category", id))
    }

    async fn create_category(&self, category: &NewCategory) -> Result<Category, DbError> {
        let created = sqlx::query_as(
            r#"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description
            "#,
        )
        .bind(category.name.as_str())
        .bind(category.description.as_deref())
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn delete_category(&self, id: i32) -> Result<(), DbError> {
        let deleted = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(DbError::not_found("category", id));
        }
        Ok(())
    }

    async fn posts_in_category(
        &self,
        category_id: i32,
        order: PostOrder,
    ) -> Result<Vec<PostSummary>, DbError> {
        self.get_category(category_id).await?;

        let posts = sqlx::query_as(&post_summary_sql(PostFilter::Category, order, false))
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(posts)
    }

    async fn list_comments(
        &self,
        post_id: i32,
        sort: CommentSort,
        limit: CommentLimit,
    ) -> Result<Vec<Comment>, DbError> {
        let comments = sqlx::query_as(&comment_list_sql(sort))
            .bind(post_id)
            .bind(i64::from(limit.get()))
            .fetch_all(&self.pool)
            .await?;
        Ok(comments)
    }

    async fn get_comment(&self, id: i32) -> Result<Comment, DbError> {
        sqlx::query_as(&format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("comment", id))
    }

    async fn create_comment(
        &self,
        post_id: i32,
        content: &CommentContent,
    ) -> Result<Comment, DbError> {
        let result = sqlx::query_as(&format!(
            r#"
            INSERT INTO comments (content, post_id)
            VALUES ($1, $2)
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(content.as_str())
        .bind(post_id)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(comment) => Ok(comment),
            Err(e) if is_foreign_key_violation(&e) => Err(DbError::not_found("post", post_id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_comment(
        &self,
        id: i32,
        content: &CommentContent,
    ) -> Result<Comment, DbError> {
        sqlx::query_as(&format!(
            "UPDATE comments SET content = $1 WHERE id = $2 RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(content.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("comment", id))
    }

    async fn like_comment(&self, id: i32) -> Result<i32, DbError> {
        let likes: Option<(i32,)> =
            sqlx::query_as("UPDATE comments SET likes = likes + 1 WHERE id = $1 RETURNING likes")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    if has_code(&e, NUMERIC_OUT_OF_RANGE) {
                        DbError::CounterOverflow {
                            resource: "comment",
                            id: id.to_string(),
                        }
                    } else {
                        e.into()
                    }
                })?;

        likes
            .map(|(n,)| n)
            .ok_or_else(|| DbError::not_found("comment", id))
    }
}
