//! JSON error responses
//!
//! Wraps [`ApiError`] so it can be returned from axum handlers. Internal detail is only
//! serialized when `expose_error_details` is enabled.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use weather_core::ApiError;

/// An [`ApiError`] plus the decision whether to expose its debug detail.
#[derive(Debug)]
pub struct ErrorResponse {
    error: ApiError,
    expose_details: bool,
}

impl ErrorResponse {
    pub fn new(error: ApiError, expose_details: bool) -> Self {
        Self { error, expose_details }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.error.status(), Json(self.error.body(self.expose_details))).into_response()
    }
}

/// Body for `/api/*` paths that match no endpoint.
pub fn api_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not found",
            "message": "API endpoint not found",
        })),
    )
        .into_response()
}
