//! Sort orders and list limits

/// Default number of comments returned by the comments API
pub const DEFAULT_COMMENT_LIMIT: u32 = 100;

/// Upper bound on a single comments request
pub const MAX_COMMENT_LIMIT: u32 = 500;

/// Comment ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommentSort {
    /// created_at descending
    #[default]
    Newest,
    /// created_at ascending
    Oldest,
    /// likes descending
    Likes,
}

impl CommentSort {
    /// Parse a `sort` query value. Unknown values fall back to newest.
    pub fn from_param(s: Option<&str>) -> Self {
        match s.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("likes") => Self::Likes,
            Some("oldest") => Self::Oldest,
            _ => Self::Newest,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::Likes => "likes",
        }
    }
}

/// Post ordering by creation time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostOrder {
    #[default]
    Desc,
    Asc,
}

impl PostOrder {
    /// `asc` selects oldest first; anything else is newest first.
    pub fn from_param(s: Option<&str>) -> Self {
        match s.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }

    pub fn is_ascending(&self) -> bool {
        matches!(self, Self::Asc)
    }
}

/// Clamped comment limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentLimit(u32);

impl CommentLimit {
    /// Clamp to `1..=500`.
    pub fn new(n: u32) -> Self {
        Self(n.clamp(1, MAX_COMMENT_LIMIT))
    }

    /// Parse a `limit` query value; missing or unparsable values use the default.
    pub fn from_param(s: Option<&str>) -> Self {
        s.and_then(|s| s.trim().parse::<u32>().ok())
            .map(Self::new)
            .unwrap_or_default()
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for CommentLimit {
    fn default() -> Self {
        Self(DEFAULT_COMMENT_LIMIT)
    }
}
