//! Custom Axum extractors

use std::sync::Arc;

use axum::extract::{FromRequestParts, Path};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::error::ApiError;
use super::server::AppState;
use crate::config::ApiKeys;
use crate::models::ValidationError;

/// Header carrying the caller's API key
pub const API_KEY_HEADER: &str = "apikey";

/// Parse a positive integer row id.
pub fn parse_id(field: &'static str, raw: &str) -> Result<i32, ApiError> {
    match raw.trim().parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::Validation(ValidationError::InvalidFormat {
            field,
            reason: "must be a positive integer id",
        })),
    }
}

/// Extract and validate a numeric id from a single-segment path
pub struct ValidId(pub i32);

impl<S> FromRequestParts<S> for ValidId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                ApiError::Validation(ValidationError::InvalidFormat {
                    field: "id",
                    reason: "must be a positive integer id",
                })
            })?;

        parse_id("id", &raw).map(Self)
    }
}

/// Caller privilege, ordered from least to most.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AccessLevel {
    /// No recognised key
    Public,
    /// Anonymous key: read and everyday writes
    Anonymous,
    /// Service-role key: destructive operations
    ServiceRole,
}

impl AccessLevel {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Anonymous => "anonymous",
            Self::ServiceRole => "service role",
        }
    }

    /// Resolve the level granted by a presented key.
    ///
    /// An unset service-role key grants everyone service role; an unset
    /// anon key grants everyone at least anonymous.
    pub fn resolve(keys: &ApiKeys, presented: Option<&str>) -> Self {
        let Some(service_key) = keys.service_role_key.as_deref() else {
            return Self::ServiceRole;
        };

        match presented {
            Some(k) if k == service_key => Self::ServiceRole,
            Some(k) if keys.anon_key.as_deref() == Some(k) => Self::Anonymous,
            _ if keys.anon_key.is_none() => Self::Anonymous,
            _ => Self::Public,
        }
    }
}

/// Caller access resolved from `apikey` or `Authorization: Bearer`
#[derive(Debug, Clone, Copy)]
pub struct Access(pub AccessLevel);

impl Access {
    /// Fail with 403 unless the caller has at least `level`.
    pub fn require(&self, level: AccessLevel) -> Result<(), ApiError> {
        if self.0 >= level {
            Ok(())
        } else {
            Err(ApiError::Forbidden {
                reason: format!("{} access required", level.as_str()),
            })
        }
    }
}

fn presented_key(parts: &Parts) -> Option<&str> {
    if let Some(key) = parts
        .headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        return Some(key.trim());
    }

    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

impl FromRequestParts<Arc<AppState>> for Access {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(AccessLevel::resolve(&state.keys, presented_key(parts))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(anon: Option<&str>, service: Option<&str>) -> ApiKeys {
        ApiKeys::new(anon.map(Into::into), service.map(Into::into))
    }

    #[test]
    fn open_when_no_service_key() {
        let k = keys(None, None);
        assert_eq!(AccessLevel::resolve(&k, None), AccessLevel::ServiceRole);
    }

    #[test]
    fn resolves_presented_keys() {
        let k = keys(Some("anon"), Some("service"));
        assert_eq!(AccessLevel::resolve(&k, Some("service")), AccessLevel::ServiceRole);
        assert_eq!(AccessLevel::resolve(&k, Some("anon")), AccessLevel::Anonymous);
        assert_eq!(AccessLevel::resolve(&k, Some("wrong")), AccessLevel::Public);
        assert_eq!(AccessLevel::resolve(&k, None), AccessLevel::Public);
    }

    #[test]
    fn no_anon_key_means_anonymous_by_default() {
        let k = keys(None, Some("service"));
        assert_eq!(AccessLevel::resolve(&k, None), AccessLevel::Anonymous);
        assert_eq!(AccessLevel::resolve(&k, Some("service")), AccessLevel::ServiceRole);
    }

    #[test]
    fn require_compares_levels() {
        assert!(Access(AccessLevel::ServiceRole)
            .require(AccessLevel::Anonymous)
            .is_ok());
        assert!(Access(AccessLevel::Anonymous)
            .require(AccessLevel::ServiceRole)
            .is_err());
    }

    #[test]
    fn parses_ids() {
        assert_eq!(parse_id("id", "12").unwrap(), 12);
        assert!(parse_id("id", "0").is_err());
        assert!(parse_id("id", "abc").is_err());
    }
}
