use async_trait::async_trait;
use reqwest::StatusCode;
use std::fmt::Debug;
use thiserror::Error;

use crate::model::{AirQuality, UpstreamPayload, WeatherQuery};

pub mod weatherapi;

pub use weatherapi::WeatherApiClient;

/// Transport-level failures where no upstream response was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NetworkFailure {
    #[error("Connection to the weather service was refused")]
    ConnectionRefused,

    #[error("The weather service host could not be resolved")]
    HostNotFound,

    #[error("The weather service host is unreachable")]
    HostUnreachable,

    #[error("The weather service did not respond in time")]
    Timeout,
}

impl NetworkFailure {
    pub fn help(&self) -> &'static str {
        match self {
            NetworkFailure::ConnectionRefused => {
                "The weather service is not accepting connections; try again later"
            }
            NetworkFailure::HostNotFound => {
                "Check DNS resolution and the configured WEATHER_API_BASE_URL"
            }
            NetworkFailure::HostUnreachable => "Check the server's network connectivity",
            NetworkFailure::Timeout => "The weather service is slow to respond; try again later",
        }
    }
}

/// Outcome of an upstream call that did not produce a usable payload.
#[derive(Debug, Clone, Error)]
pub enum UpstreamFailure {
    /// The provider answered with a non-2xx status.
    #[error("upstream responded with HTTP {status}")]
    Status { status: StatusCode, body: Option<serde_json::Value> },

    #[error(transparent)]
    Network(#[from] NetworkFailure),

    /// A 2xx response whose body is not JSON.
    #[error("upstream returned a non-JSON body: {0}")]
    MalformedBody(String),

    #[error("upstream request failed: {0}")]
    Other(String),
}

/// One outbound "current conditions" call per invocation. No retries, no caching.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(
        &self,
        query: &WeatherQuery,
        api_key: &str,
        air_quality: AirQuality,
    ) -> Result<UpstreamPayload, UpstreamFailure>;
}
