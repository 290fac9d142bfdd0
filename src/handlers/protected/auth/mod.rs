use axum::{Extension, Json};

use crate::auth::Claims;

/// GET /auth/verify - Return the claims of the presented token
pub async fn verify(Extension(claims): Extension<Claims>) -> Json<Claims> {
    tracing::debug!(user_id = %claims.id, "Token verified");
    Json(claims)
}
