//! Comment content validation

use super::validation::{required_text, ValidationError};

/// Validated comment body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentContent(String);

impl CommentContent {
    /// Non-empty after trimming whitespace.
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        required_text(s, "content", None).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
