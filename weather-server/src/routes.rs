//! Route definitions

use axum::{
    Router, middleware,
    routing::{any, get},
};
use tower_http::services::{ServeDir, ServeFile};

use crate::{handlers, middleware::access_log, state::AppState};

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let static_dir = state.config.server.static_dir.clone();
    let index = static_dir.join("index.html");

    Router::new()
        // Health
        .route("/health", get(handlers::health::health_check))
        // Weather API
        .route("/api/weather", get(handlers::weather::missing_city))
        .route("/api/weather/", get(handlers::weather::missing_city))
        .route("/api/weather/{city}", get(handlers::weather::get_weather))
        // Any other API path is a JSON 404
        .route("/api", any(handlers::fallback::api_not_found))
        .route("/api/", any(handlers::fallback::api_not_found))
        .route("/api/{*rest}", any(handlers::fallback::api_not_found))
        // Everything else is the static client; unknown paths get index.html
        .fallback_service(ServeDir::new(static_dir).fallback(ServeFile::new(index)))
        .layer(middleware::from_fn(access_log))
        .with_state(state)
}
