// HTTP API Error Types
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::middleware::error::FailureReport;

/// Message sent to clients whenever a request fails for reasons they cannot fix
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error. Check the server console";

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error; the detail stays on the server
    InternalServerError { detail: String },
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError { .. } => INTERNAL_ERROR_MESSAGE,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({ "message": self.message() })
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal(detail: impl std::fmt::Display) -> Self {
        ApiError::InternalServerError {
            detail: detail.to_string(),
        }
    }
}

impl From<crate::database::StoreError> for ApiError {
    fn from(err: crate::database::StoreError) -> Self {
        match err {
            crate::database::StoreError::InvalidId(value) => {
                ApiError::bad_request(format!("Invalid identifier: {}", value))
            }
            crate::database::StoreError::Duplicate(_) => ApiError::conflict("User already exists"),
            other => ApiError::internal(other),
        }
    }
}

impl From<crate::auth::TokenError> for ApiError {
    fn from(err: crate::auth::TokenError) -> Self {
        match err {
            crate::auth::TokenError::Invalid(reason) => ApiError::unauthorized(reason),
            other => ApiError::internal(other),
        }
    }
}

impl From<crate::services::AuthError> for ApiError {
    fn from(err: crate::services::AuthError) -> Self {
        use crate::services::AuthError;

        match err {
            AuthError::MissingSignupFields => {
                ApiError::bad_request("Provide email, password and name")
            }
            AuthError::InvalidEmail => ApiError::bad_request("Provide a valid email address"),
            AuthError::MissingLoginFields => ApiError::bad_request("Provide email and password"),
            AuthError::UserExists => ApiError::conflict("User already exists"),
            AuthError::UserNotFound => ApiError::unauthorized("User not found"),
            AuthError::WrongPassword => ApiError::unauthorized("Unable to authenticate the user"),
            AuthError::Store(e) => e.into(),
            AuthError::Token(e) => e.into(),
            AuthError::Password(e) => ApiError::internal(e),
            AuthError::Worker(e) => ApiError::internal(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_json(rejection.body_text())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::InternalServerError { detail } => write!(f, "internal error: {}", detail),
            _ => write!(f, "{}", self.message()),
        }
    }
}

impl std::error::Error for ApiError {}

// Client errors are answered inline. Internal errors leave an empty 500 tagged
// with a FailureReport; the error handler middleware logs it and writes the body.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InternalServerError { detail } => {
                let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
                response.extensions_mut().insert(FailureReport::new(detail));
                response
            }
            other => (other.status_code(), Json(other.to_json())).into_response(),
        }
    }
}
