//! Core endpoint: `GET /api/weather/{city}`

use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
};
use tracing::{debug, error, info, warn};
use weather_core::{ApiError, NormalizedWeather};

use crate::{error::ErrorResponse, state::AppState};

/// Look up current conditions for the URL-decoded `city` path segment.
pub async fn get_weather(
    State(state): State<AppState>,
    city: Result<Path<String>, PathRejection>,
) -> Result<Json<NormalizedWeather>, ErrorResponse> {
    let city = match city {
        Ok(Path(city)) => city,
        Err(rejection) => {
            // Undecodable segments are treated like a missing city.
            debug!(%rejection, "Rejected city path segment");
            String::new()
        }
    };

    lookup(&state, &city).await
}

/// `GET /api/weather` and `GET /api/weather/` carry no city at all.
pub async fn missing_city(
    State(state): State<AppState>,
) -> Result<Json<NormalizedWeather>, ErrorResponse> {
    lookup(&state, "").await
}

async fn lookup(state: &AppState, city: &str) -> Result<Json<NormalizedWeather>, ErrorResponse> {
    match state.service.current_weather(city).await {
        Ok(weather) => {
            info!(
                city = %city.trim(),
                location = %weather.location.name,
                "Weather lookup succeeded"
            );
            Ok(Json(weather))
        }
        Err(err) => {
            log_failure(&err, city);
            Err(ErrorResponse::new(err, state.config.server.expose_error_details))
        }
    }
}

fn log_failure(err: &ApiError, city: &str) {
    let status = err.status().as_u16();
    if err.status().is_server_error() {
        error!(
            kind = %err.kind(),
            status,
            city = %city.trim(),
            detail = ?err.debug_detail(),
            "Weather lookup failed: {err}"
        );
    } else {
        warn!(kind = %err.kind(), status, city = %city.trim(), "Weather lookup rejected: {err}");
    }
}
