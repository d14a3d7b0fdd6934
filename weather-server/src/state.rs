//! Application state shared across handlers

use std::sync::Arc;

use weather_core::{Config, WeatherService};

/// Shared, read-only application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Lookup orchestration (validation, upstream call, normalization)
    pub service: Arc<WeatherService>,
    /// Configuration fixed at startup
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, service: WeatherService) -> Self {
        Self { service: Arc::new(service), config: Arc::new(config) }
    }

    /// Build state backed by the live WeatherAPI.com client.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let service = WeatherService::from_config(&config)?;
        Ok(Self::new(config, service))
    }
}
