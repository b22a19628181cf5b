//! Service info and health.

use super::blocking;
use crate::api::AppState;
use crate::api::error::ApiError;
use crate::api::types::{HealthResponse, ServiceInfo};
use axum::Json;
use axum::extract::State;
use raildb_core::GradeStore;
use std::collections::BTreeMap;

/// `GET /`
pub async fn root() -> Json<ServiceInfo> {
    let endpoints = [
        ("students", "/students"),
        ("analytics", "/analytics"),
        ("latex", "/latex"),
        ("health", "/health"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect::<BTreeMap<_, _>>();

    Json(ServiceInfo {
        message: "Rail DB Student Grades API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints,
    })
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let records = blocking(&state.store, GradeStore::count)
        .await
        .map_err(|e| ApiError::Unavailable(e.to_string()))?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        database: "connected".to_string(),
        records,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
