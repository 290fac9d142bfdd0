use axum::{extract::State, http::StatusCode, Json};

use crate::database::models::PublicUser;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::services::{AuthService, SignupRequest};
use crate::state::AppState;

/// POST /auth/signup - Register a new user
///
/// Expected Input:
/// ```json
/// { "email": "ada@example.com", "password": "string", "name": "Ada" }
/// ```
///
/// Expected Output (201):
/// ```json
/// { "_id": "uuid", "email": "ada@example.com", "name": "Ada" }
/// ```
///
/// Failures: 400 missing fields or malformed email, 409 email taken.
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    let user = AuthService::new(state.store.as_ref(), &state.tokens)
        .signup(payload)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}
