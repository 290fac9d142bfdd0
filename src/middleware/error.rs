use std::any::Any;
use std::sync::Arc;

use axum::{
    body::HttpBody,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::error::{ApiError, INTERNAL_ERROR_MESSAGE};

pub const NOT_FOUND_MESSAGE: &str = "This route does not exist";

/// Marker left on a response by a failed handler. Holds the internal detail
/// that is logged but never sent to the client.
#[derive(Debug, Clone)]
pub struct FailureReport {
    detail: Arc<str>,
}

impl FailureReport {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Arc::from(detail.into()),
        }
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

/// Last stage of the pipeline: turns failures reported by handlers into the
/// generic 500 response and logs method, path and detail.
///
/// A failed response that already has a body has been answered; it is logged
/// and passed through untouched so the client never receives two answers.
pub async fn error_handler(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let mut response = next.run(request).await;

    let Some(report) = response.extensions_mut().remove::<FailureReport>() else {
        return response;
    };

    tracing::error!(%method, %path, error = %report.detail(), "ERROR");

    if already_responded(&response) {
        return response;
    }
    internal_error_response()
}

/// Fallback for requests no route accepts
pub async fn not_found_handler() -> Response {
    ApiError::not_found(NOT_FOUND_MESSAGE).into_response()
}

/// Panic hook for `CatchPanicLayer`: the panic becomes an ordinary reported
/// failure for [`error_handler`] to log and answer.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else {
        "handler panicked".to_string()
    };

    ApiError::internal(format!("panic: {}", detail)).into_response()
}

fn already_responded(response: &Response) -> bool {
    response.body().size_hint().exact() != Some(0)
}

fn internal_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": INTERNAL_ERROR_MESSAGE })),
    )
        .into_response()
}
