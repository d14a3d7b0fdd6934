//! HTTP front end for the weather lookup proxy.
//!
//! Exposes `GET /api/weather/{city}` and `GET /health` on top of
//! [`weather_core::WeatherService`], and serves the static client page for everything else.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ErrorResponse;
pub use routes::create_router;
pub use state::AppState;
