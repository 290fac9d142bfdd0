use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::database::models::{Cohort, CohortFields};
use crate::database::parse_id;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

/// GET /api/cohorts - All cohorts
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Cohort>>, ApiError> {
    let cohorts = state.store.list_cohorts().await?;
    tracing::debug!("Retrieved {} cohorts", cohorts.len());
    Ok(Json(cohorts))
}

/// GET /api/cohorts/:cohortId - One cohort, or `null` when it does not exist
pub async fn show(
    State(state): State<AppState>,
    Path(cohort_id): Path<String>,
) -> Result<Json<Option<Cohort>>, ApiError> {
    let id = parse_id(&cohort_id)?;
    Ok(Json(state.store.find_cohort(id).await?))
}

/// POST /api/cohorts - Create a cohort from whichever fields are supplied
pub async fn create(
    State(state): State<AppState>,
    ApiJson(fields): ApiJson<CohortFields>,
) -> Result<(StatusCode, Json<Cohort>), ApiError> {
    let cohort = state.store.create_cohort(fields).await?;
    tracing::info!(cohort_id = %cohort.id, "Cohort created");
    Ok((StatusCode::CREATED, Json(cohort)))
}

/// PUT /api/cohorts/:cohortId - Partial update; answers the updated cohort or `null`
pub async fn update(
    State(state): State<AppState>,
    Path(cohort_id): Path<String>,
    ApiJson(patch): ApiJson<CohortFields>,
) -> Result<Json<Option<Cohort>>, ApiError> {
    let id = parse_id(&cohort_id)?;
    Ok(Json(state.store.update_cohort(id, patch).await?))
}

/// DELETE /api/cohorts/:cohortId - Students keep their (now dangling) reference
pub async fn delete(
    State(state): State<AppState>,
    Path(cohort_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&cohort_id)?;
    if state.store.delete_cohort(id).await? {
        tracing::info!(cohort_id = %id, "Cohort deleted");
    }
    Ok(StatusCode::OK)
}
