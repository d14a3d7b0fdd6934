//! Unmatched `/api/*` paths

use axum::{http::Uri, response::Response};
use tracing::debug;

use crate::error;

/// Structured 404 for API paths with no handler; non-API paths go to the static client.
pub async fn api_not_found(uri: Uri) -> Response {
    debug!(path = %uri.path(), "No API endpoint matched");
    error::api_not_found()
}
