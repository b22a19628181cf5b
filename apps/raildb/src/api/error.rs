//! HTTP error type.
//!
//! Every failure leaves the service as `{"success": false, "error": "..."}`
//! with the status code of its variant.

use super::types::ErrorResponse;
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use raildb_core::{FragilityError, GradeError, StoreError};
use thiserror::Error;

/// Errors returned by handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Database error: {0}")]
    Storage(String),

    #[error("Service unhealthy: {0}")]
    Unavailable(String),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

impl From<FragilityError> for ApiError {
    fn from(e: FragilityError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<GradeError> for ApiError {
    fn from(e: GradeError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(key) => Self::NotFound(format!("No grade record found for {key}")),
            StoreError::Invalid(e) => e.into(),
            other => Self::Storage(other.to_string()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        Self::BadRequest(e.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::BadRequest(e.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(e: PathRejection) -> Self {
        Self::BadRequest(e.body_text())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Storage(format!("store task failed: {e}"))
    }
}
