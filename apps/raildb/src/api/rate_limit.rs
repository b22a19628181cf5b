//! Process-wide request rate limiting.
//!
//! A single governor token bucket: `requests_per_second` tokens refill per
//! second and the burst size equals the same value.

use super::AppState;
use super::error::ApiError;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Shared limiter handle.
pub type SharedLimiter = Arc<DefaultDirectRateLimiter>;

/// Build a limiter allowing `requests_per_second` with an equal burst.
#[must_use]
pub fn limiter(requests_per_second: NonZeroU32) -> SharedLimiter {
    Arc::new(RateLimiter::direct(Quota::per_second(requests_per_second)))
}

/// Middleware rejecting requests once the bucket is empty.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if state.limiter.check().is_err() {
        tracing::warn!(path = %request.uri().path(), "Rate limit exceeded");
        return ApiError::RateLimited.into_response();
    }
    next.run(request).await
}
