//! Aggregate statistics over the whole grade table.

use super::all_records;
use crate::api::AppState;
use crate::api::error::ApiError;
use crate::api::types::{PerfectScoresResponse, TopStudentsQuery, TopStudentsResponse};
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use raildb_core::analytics::{self, GradeBucket, GradeSummary, TestStats, YearlyStats};

/// `GET /analytics/summary`
pub async fn summary(State(state): State<AppState>) -> Result<Json<GradeSummary>, ApiError> {
    let records = all_records(&state.store).await?;
    analytics::summary(&records)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No data found".to_string()))
}

/// `GET /analytics/test-stats`
pub async fn test_stats(State(state): State<AppState>) -> Result<Json<Vec<TestStats>>, ApiError> {
    let records = all_records(&state.store).await?;
    Ok(Json(analytics::test_stats(&records)))
}

/// `GET /analytics/yearly-stats`
pub async fn yearly_stats(
    State(state): State<AppState>,
) -> Result<Json<Vec<YearlyStats>>, ApiError> {
    let records = all_records(&state.store).await?;
    Ok(Json(analytics::yearly_stats(&records)))
}

/// `GET /analytics/grade-distribution`
pub async fn grade_distribution(
    State(state): State<AppState>,
) -> Result<Json<Vec<GradeBucket>>, ApiError> {
    let records = all_records(&state.store).await?;
    Ok(Json(analytics::grade_distribution(&records)))
}

/// `GET /analytics/top-students`
pub async fn top_students(
    State(state): State<AppState>,
    query: Result<Query<TopStudentsQuery>, QueryRejection>,
) -> Result<Json<TopStudentsResponse>, ApiError> {
    let Query(query) = query?;
    let limit = query.validated()?;

    let records = all_records(&state.store).await?;
    Ok(Json(TopStudentsResponse {
        top_students: analytics::top_students(&records, limit),
    }))
}

/// `GET /analytics/perfect-scores`
pub async fn perfect_scores(
    State(state): State<AppState>,
) -> Result<Json<PerfectScoresResponse>, ApiError> {
    let records = all_records(&state.store).await?;
    let perfect_scores = analytics::perfect_scores(&records);

    Ok(Json(PerfectScoresResponse {
        total_perfect_scores: perfect_scores.len(),
        perfect_scores,
    }))
}
