// handlers/public/auth/mod.rs - Token acquisition endpoints
//
// POST /auth/signup creates an account, POST /auth/login exchanges
// credentials for a session token valid for the configured expiry.

pub mod login;
pub mod signup;

pub use login::login;
pub use signup::signup;

/// GET /auth - liveness probe for the auth router
pub async fn index() -> axum::Json<&'static str> {
    axum::Json("All good in auth")
}
