//! Reshapes a WeatherAPI.com `current.json` payload into [`NormalizedWeather`].
//!
//! Field mapping (provider → local):
//!
//! | provider                     | local                         |
//! |------------------------------|-------------------------------|
//! | `location.name`              | `location.name`               |
//! | `location.country`           | `location.country`            |
//! | `location.region`            | `location.region`             |
//! | `location.localtime`         | `location.localTime`          |
//! | `current.temp_c`             | `current.temp_c`              |
//! | `current.feelslike_c`        | `current.feelslike_c`         |
//! | `current.condition.text`     | `current.condition.text`      |
//! | `current.condition.icon`     | `current.condition.icon`      |
//! | `current.humidity`           | `current.humidity`            |
//! | `current.wind_kph`           | `current.wind_kph`            |
//! | `current.wind_dir`           | `current.wind_dir`            |
//! | `current.pressure_mb`        | `current.pressure_mb`         |
//! | `current.vis_km`             | `current.vis_km`              |
//! | `current.uv`                 | `current.uv`                  |
//! | `current.last_updated`       | `current.last_updated`        |
//!
//! Values pass through unconverted. Any missing or mistyped field fails the whole payload.

use serde::Deserialize;
use thiserror::Error;

use crate::model::{Condition, CurrentConditions, Location, NormalizedWeather, UpstreamPayload};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("upstream payload has a missing or invalid field: {0}")]
pub struct ShapeError(pub String);

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    country: String,
    region: String,
    localtime: String,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    feelslike_c: f64,
    condition: WaCondition,
    humidity: u8,
    wind_kph: f64,
    wind_dir: String,
    pressure_mb: f64,
    vis_km: f64,
    uv: f64,
    last_updated: String,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
}

pub fn normalize(payload: &UpstreamPayload) -> Result<NormalizedWeather, ShapeError> {
    let parsed =
        WaResponse::deserialize(payload.as_value()).map_err(|e| ShapeError(e.to_string()))?;

    Ok(NormalizedWeather {
        location: Location {
            name: parsed.location.name,
            country: parsed.location.country,
            region: parsed.location.region,
            local_time: parsed.location.localtime,
        },
        current: CurrentConditions {
            temp_c: parsed.current.temp_c,
            feelslike_c: parsed.current.feelslike_c,
            condition: Condition {
                text: parsed.current.condition.text,
                icon: parsed.current.condition.icon,
            },
            humidity: parsed.current.humidity,
            wind_kph: parsed.current.wind_kph,
            wind_dir: parsed.current.wind_dir,
            pressure_mb: parsed.current.pressure_mb,
            vis_km: parsed.current.vis_km,
            uv: parsed.current.uv,
            last_updated: parsed.current.last_updated,
        },
    })
}
