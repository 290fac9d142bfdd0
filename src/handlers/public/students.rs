use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::database::models::{PopulatedStudent, StudentInput};
use crate::database::parse_id;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::services::StudentService;
use crate::state::AppState;

// Every student answer carries its cohort resolved to the full record.

/// GET /api/students
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<PopulatedStudent>>, ApiError> {
    let students = StudentService::new(state.store.as_ref()).list().await?;
    tracing::debug!("Retrieved {} students", students.len());
    Ok(Json(students))
}

/// GET /api/students/cohort/:cohortId
pub async fn list_by_cohort(
    State(state): State<AppState>,
    Path(cohort_id): Path<String>,
) -> Result<Json<Vec<PopulatedStudent>>, ApiError> {
    let cohort_id = parse_id(&cohort_id)?;
    let students = StudentService::new(state.store.as_ref())
        .list_by_cohort(cohort_id)
        .await?;
    Ok(Json(students))
}

/// GET /api/students/:studentId
pub async fn show(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<Option<PopulatedStudent>>, ApiError> {
    let id = parse_id(&student_id)?;
    Ok(Json(StudentService::new(state.store.as_ref()).find(id).await?))
}

/// POST /api/students
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<StudentInput>,
) -> Result<(StatusCode, Json<PopulatedStudent>), ApiError> {
    let student = StudentService::new(state.store.as_ref()).create(input).await?;
    tracing::info!(student_id = %student.id, "Student created");
    Ok((StatusCode::CREATED, Json(student)))
}

/// PUT /api/students/:studentId
pub async fn update(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    ApiJson(patch): ApiJson<StudentInput>,
) -> Result<Json<Option<PopulatedStudent>>, ApiError> {
    let id = parse_id(&student_id)?;
    Ok(Json(StudentService::new(state.store.as_ref()).update(id, patch).await?))
}

/// DELETE /api/students/:studentId
pub async fn delete(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&student_id)?;
    if StudentService::new(state.store.as_ref()).delete(id).await? {
        tracing::info!(student_id = %id, "Student deleted");
    }
    Ok(StatusCode::OK)
}
