//! Error types for the gateway
//!
//! `ApiError` is the single error surfaced to HTTP callers. Every variant maps
//! to a status code, so a failed request always produces a response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;
use crate::store::StoreError;

// == Api Error Enum ==
/// Unified error type for request handling.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Requested collection or record id is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or incorrect credential on a mutating verb
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Unparseable body or invalid field values
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A stored record does not have the shape the collection schema expects
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// The store is throttling requests
    #[error("Upstream rate limited: {0}")]
    UpstreamRateLimited(String),

    /// The store rejected the shape of a write
    #[error("Upstream validation failed: {0}")]
    UpstreamValidation(String),

    /// The store timed out or could not be reached
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Anything else
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::MalformedInput(_) | ApiError::UpstreamValidation(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::UpstreamRateLimited(_) | ApiError::UpstreamUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::MalformedRecord(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// == Store Error Conversion ==
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RateLimited(msg) => ApiError::UpstreamRateLimited(msg),
            StoreError::Validation(msg) => ApiError::UpstreamValidation(msg),
            StoreError::NotFound(msg) => ApiError::NotFound(msg),
            StoreError::Timeout(msg) | StoreError::Transport(msg) => {
                ApiError::UpstreamUnavailable(msg)
            }
            StoreError::Decode(msg) => ApiError::MalformedRecord(msg),
            StoreError::Upstream { status, message } => {
                ApiError::Internal(format!("store returned {}: {}", status, message))
            }
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed with {}: {}", status, self);
        }

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the gateway.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn test_error_status_codes() {
        let test_cases = vec![
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ApiError::MalformedInput("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::UpstreamValidation("x".into()), StatusCode::BAD_REQUEST),
            (
                ApiError::UpstreamRateLimited("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ApiError::UpstreamUnavailable("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ApiError::MalformedRecord("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected_status) in test_cases {
            assert_eq!(error.into_response().status(), expected_status);
        }
    }

    #[test]
    fn test_store_errors_convert() {
        assert!(matches!(
            ApiError::from(StoreError::RateLimited("slow down".into())),
            ApiError::UpstreamRateLimited(_)
        ));
        assert!(matches!(
            ApiError::from(StoreError::Validation("bad select".into())),
            ApiError::UpstreamValidation(_)
        ));
        assert!(matches!(
            ApiError::from(StoreError::Timeout("10s".into())),
            ApiError::UpstreamUnavailable(_)
        ));
        assert!(matches!(
            ApiError::from(StoreError::Upstream {
                status: 502,
                message: "bad gateway".into()
            }),
            ApiError::Internal(_)
        ));
    }

    #[tokio::test]
    async fn test_error_body_has_error_field() {
        let response = ApiError::NotFound("Record 99 not found".into()).into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["error"], "Not found: Record 99 not found");
    }
}
