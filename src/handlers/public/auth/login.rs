use axum::{extract::State, Json};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::services::{AuthService, LoginRequest, LoginResponse};
use crate::state::AppState;

/// POST /auth/login - Authenticate and receive a session token
///
/// Expected Input:
/// ```json
/// { "email": "ada@example.com", "password": "string" }
/// ```
///
/// Expected Output (200):
/// ```json
/// { "authToken": "eyJhbGciOiJIUzI1NiI..." }
/// ```
///
/// Unknown email and wrong password both answer 401.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let response = AuthService::new(state.store.as_ref(), &state.tokens)
        .login(payload)
        .await?;

    Ok(Json(response))
}
