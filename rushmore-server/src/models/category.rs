//! Category name validation and form-style category references

use serde::Deserialize;

use super::validation::{required_text, ValidationError};

/// Maximum length for category names (matches `VARCHAR(100)`)
const MAX_CATEGORY_NAME_LEN: usize = 100;

/// Validated category name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryName(String);

impl CategoryName {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        required_text(s, "category name", Some(MAX_CATEGORY_NAME_LEN)).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A validated category ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: CategoryName,
    pub description: Option<String>,
}

impl NewCategory {
    /// Blank descriptions are stored as NULL.
    pub fn new(name: &str, description: Option<&str>) -> Result<Self, ValidationError> {
        Ok(Self {
            name: CategoryName::new(name)?,
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_owned),
        })
    }
}

/// Category reference as submitted by a client.
///
/// Forms send the selected option as a string (`""` for "no category"),
/// JSON clients send a number. Both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Id(i64),
    Text(String),
}

impl CategoryRef {
    /// Resolve an optional reference to a category id.
    ///
    /// Missing, `""`, and `0` mean no category.
    pub fn resolve(input: Option<&CategoryRef>) -> Result<Option<i32>, ValidationError> {
        match input {
            None => Ok(None),
            Some(Self::Id(id)) => id_from_i64(*id),
            Some(Self::Text(raw)) => Self::parse(Some(raw)),
        }
    }

    /// Parse a string category reference.
    pub fn parse(raw: Option<&str>) -> Result<Option<i32>, ValidationError> {
        let Some(raw) = raw.map(str::trim) else {
            return Ok(None);
        };

        if raw.is_empty() {
            return Ok(None);
        }

        let id: i64 = raw.parse().map_err(|_| ValidationError::InvalidFormat {
            field: "categoryId",
            reason: "must be a category id",
        })?;

        id_from_i64(id)
    }
}

fn id_from_i64(id: i64) -> Result<Option<i32>, ValidationError> {
    if id == 0 {
        return Ok(None);
    }

    i32::try_from(id)
        .ok()
        .filter(|id| *id > 0)
        .map(Some)
        .ok_or(ValidationError::InvalidFormat {
            field: "categoryId",
            reason: "must be a positive id",
        })
}
