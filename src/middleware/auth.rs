use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Bearer token authentication for protected routes.
///
/// On success the decoded [`crate::auth::Claims`] are inserted into the request
/// extensions. Any failure answers 401 without calling the inner handler.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers()).map_err(|msg| {
        tracing::debug!("Rejected request without usable bearer token: {}", msg);
        ApiError::unauthorized(msg)
    })?;

    let claims = state.tokens.verify(token).map_err(|e| {
        tracing::warn!("Rejected bearer token: {}", e);
        ApiError::from(e)
    })?;

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or("Authorization header must use Bearer token format")?
        .trim();

    if token.is_empty() {
        return Err("Empty bearer token");
    }
    Ok(token)
}
