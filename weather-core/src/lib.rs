//! Core library for the weather lookup proxy.
//!
//! This crate defines:
//! - Configuration loading (file, environment, defaults)
//! - The upstream client abstraction and the live WeatherAPI.com client
//! - Normalization of upstream payloads into a stable schema
//! - The local error taxonomy and its HTTP status mapping
//! - [`WeatherService`], which validates and orchestrates a single lookup
//!
//! It is used by `weather-server`, but has no dependency on any HTTP framework.

pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod service;

pub use config::{Config, ServerConfig, UpstreamConfig};
pub use error::{ApiError, ErrorBody, ErrorKind, classify};
pub use model::{AirQuality, NormalizedWeather, UpstreamPayload, WeatherQuery};
pub use normalize::{ShapeError, normalize};
pub use provider::{NetworkFailure, UpstreamFailure, WeatherApiClient, WeatherProvider};
pub use service::WeatherService;
