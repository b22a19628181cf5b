//! Grade CRUD and per-student statistics.

use super::{all_records, blocking};
use crate::api::AppState;
use crate::api::error::ApiError;
use crate::api::types::{ApiResponse, GradeQuery, StatsQuery};
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use raildb_core::analytics::{self, StudentStats};
use raildb_core::{GradeKey, GradeRecord, GradeUpdate, NewGrade, UpsertOutcome};
use tracing::info;

/// `GET /students/grades`
pub async fn list_grades(
    State(state): State<AppState>,
    query: Result<Query<GradeQuery>, QueryRejection>,
) -> Result<Json<Vec<GradeRecord>>, ApiError> {
    let Query(query) = query?;
    let (filter, page) = query.into_parts()?;

    let records = blocking(&state.store, move |store| store.list(&filter, page)).await?;
    Ok(Json(records))
}

/// `GET /students/grades/{aem}`
pub async fn student_grades(
    State(state): State<AppState>,
    aem: Result<Path<u32>, PathRejection>,
) -> Result<Json<Vec<GradeRecord>>, ApiError> {
    let Path(aem) = aem?;

    let records = blocking(&state.store, move |store| store.by_student(aem)).await?;
    if records.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No grades found for student {aem}"
        )));
    }
    Ok(Json(records))
}

/// `POST /students/grades`
pub async fn upsert_grade(
    State(state): State<AppState>,
    body: Result<Json<NewGrade>, JsonRejection>,
) -> Result<Json<ApiResponse<UpsertOutcome>>, ApiError> {
    let Json(body) = body?;
    let grade = body.validated()?;

    let outcome = blocking(&state.store, move |store| store.upsert(&grade)).await?;
    info!(id = outcome.id, created = outcome.created, "Grade upserted");

    Ok(Json(ApiResponse::ok(
        "Grade record created/updated successfully",
        Some(outcome),
    )))
}

/// `PUT /students/grades/{aem}/{test}/{year}`
pub async fn update_grade(
    State(state): State<AppState>,
    key: Result<Path<(u32, String, i32)>, PathRejection>,
    body: Result<Json<GradeUpdate>, JsonRejection>,
) -> Result<Json<ApiResponse<GradeRecord>>, ApiError> {
    let Path((aem, test, year)) = key?;
    let Json(body) = body?;
    let grade = body
        .grade
        .ok_or_else(|| ApiError::BadRequest("grade is required".to_string()))?;

    let key = GradeKey::new(aem, test, year);
    let record = blocking(&state.store, move |store| store.update_grade(&key, grade)).await?;
    info!(id = record.id, grade = record.grade, "Grade updated");

    Ok(Json(ApiResponse::ok(
        "Grade updated successfully",
        Some(record),
    )))
}

/// `DELETE /students/grades/{aem}/{test}/{year}`
pub async fn delete_grade(
    State(state): State<AppState>,
    key: Result<Path<(u32, String, i32)>, PathRejection>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let Path((aem, test, year)) = key?;

    let key = GradeKey::new(aem, test, year);
    let deleted = key.clone();
    blocking(&state.store, move |store| store.delete(&key)).await?;
    info!(key = %deleted, "Grade deleted");

    Ok(Json(ApiResponse::ok("Grade deleted successfully", None)))
}

/// `GET /students/stats`
pub async fn student_stats(
    State(state): State<AppState>,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> Result<Json<Vec<StudentStats>>, ApiError> {
    let Query(query) = query?;
    let (limit, min_tests) = query.validated()?;

    let records = all_records(&state.store).await?;
    Ok(Json(analytics::student_stats(&records, limit, min_tests)))
}
