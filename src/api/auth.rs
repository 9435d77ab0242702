//! Caller authorization
//!
//! A caller is privileged when its `api-key` header matches the configured
//! secret. Anything else, including a wrong key, reads at the public level.

use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use subtle::ConstantTimeEq;

use super::handlers::AppState;
use crate::error::{ApiError, Result};
use crate::models::ProjectionLevel;

/// Header carrying the caller's credential.
pub const API_KEY_HEADER: &str = "api-key";

/// Constant-time comparison of two strings.
fn constant_time_str_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Resolves the projection level for a presented credential.
pub fn projection_level(expected: Option<&str>, presented: Option<&str>) -> ProjectionLevel {
    match (expected, presented) {
        (Some(expected), Some(presented)) if constant_time_str_eq(expected, presented) => {
            ProjectionLevel::Privileged
        }
        _ => ProjectionLevel::Public,
    }
}

/// Projection level of the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub ProjectionLevel);

impl Caller {
    /// Fails with `Forbidden` unless the caller is privileged.
    pub fn require_privileged(self) -> Result<()> {
        if self.0.is_privileged() {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "a valid api-key header is required".to_string(),
            ))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok());
        Ok(Caller(projection_level(state.api_key.as_deref(), presented)))
    }
}
