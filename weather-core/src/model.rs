use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// A validated city lookup: non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    city: String,
}

impl WeatherQuery {
    pub fn city(&self) -> &str {
        &self.city
    }
}

impl TryFrom<&str> for WeatherQuery {
    type Error = ApiError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let city = value.trim();
        if city.is_empty() {
            return Err(ApiError::Validation);
        }

        Ok(Self { city: city.to_string() })
    }
}

/// Whether the upstream should attach air-quality data (`aqi` query parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AirQuality {
    Include,
    #[default]
    Exclude,
}

impl AirQuality {
    pub fn as_param(&self) -> &'static str {
        match self {
            AirQuality::Include => "yes",
            AirQuality::Exclude => "no",
        }
    }
}

/// Raw JSON returned by a successful upstream call. Untrusted until normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamPayload(Value);

impl UpstreamPayload {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for UpstreamPayload {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

/// The stable response schema served by `/api/weather/{city}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedWeather {
    pub location: Location,
    pub current: CurrentConditions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: String,
    pub region: String,
    #[serde(rename = "localTime")]
    pub local_time: String,
}

/// Current conditions, metric units as reported upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp_c: f64,
    pub feelslike_c: f64,
    pub condition: Condition,
    pub humidity: u8,
    pub wind_kph: f64,
    pub wind_dir: String,
    pub pressure_mb: f64,
    pub vis_km: f64,
    pub uv: f64,
    pub last_updated: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    pub icon: String,
}
