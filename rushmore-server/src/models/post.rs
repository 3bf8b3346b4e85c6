//! Post field validation

use super::category::CategoryRef;
use super::validation::{required_text, ValidationError};

/// Maximum length for post titles (matches `VARCHAR(255)`)
const MAX_TITLE_LEN: usize = 255;

/// Maximum length for author names (matches `VARCHAR(100)`)
const MAX_AUTHOR_LEN: usize = 100;

/// Validated post title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostTitle(String);

impl PostTitle {
    /// Create a new post title.
    ///
    /// # Rules
    /// - Non-empty (after trimming whitespace)
    /// - Max 255 characters
    ///
    /// # Example
    /// ```
    /// use rushmore_server::models::PostTitle;
    ///
    /// assert!(PostTitle::new("On Superflat").is_ok());
    /// assert!(PostTitle::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        required_text(s, "title", Some(MAX_TITLE_LEN)).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated author name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorName(String);

impl AuthorName {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        required_text(s, "author", Some(MAX_AUTHOR_LEN)).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated post body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContent(String);

impl PostContent {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        required_text(s, "content", None).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Split a post body into paragraphs on blank lines.
pub fn paragraphs(content: &str) -> impl Iterator<Item = &str> {
    content
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
}

/// A fully validated post, ready to insert or to replace an existing row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: PostTitle,
    pub content: PostContent,
    pub author: AuthorName,
    pub category_id: Option<i32>,
}

impl NewPost {
    /// Validate every field; the first failure is returned.
    ///
    /// The category is optional: missing, `""` and `0` all mean
    /// "uncategorised".
    pub fn new(
        title: &str,
        content: &str,
        author: &str,
        category: Option<&CategoryRef>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            title: PostTitle::new(title)?,
            content: PostContent::new(content)?,
            author: AuthorName::new(author)?,
            category_id: CategoryRef::resolve(category)?,
        })
    }
}
