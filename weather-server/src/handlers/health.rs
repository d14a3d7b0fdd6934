//! Health check handler

use axum::{Json, extract::State};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub api_key_configured: bool,
}

/// Liveness check. Never calls upstream.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        api_key_configured: state.service.api_key_configured(),
    })
}
