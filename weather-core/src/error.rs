//! Local error taxonomy and the mapping from upstream outcomes onto it.

use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::{
    model::WeatherQuery,
    normalize::ShapeError,
    provider::{NetworkFailure, UpstreamFailure},
};

/// Stable kind names, one per row of the HTTP mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ValidationError,
    ConfigurationError,
    InvalidRequest,
    Unauthorized,
    CityNotFound,
    UpstreamError,
    ServiceUnavailable,
    UpstreamShapeError,
    InternalError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::ConfigurationError => "ConfigurationError",
            ErrorKind::InvalidRequest => "InvalidRequest",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::CityNotFound => "CityNotFound",
            ErrorKind::UpstreamError => "UpstreamError",
            ErrorKind::ServiceUnavailable => "ServiceUnavailable",
            ErrorKind::UpstreamShapeError => "UpstreamShapeError",
            ErrorKind::InternalError => "InternalError",
        }
    }

    /// Short label sent to clients in the `error` field.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "Bad request",
            ErrorKind::ConfigurationError => "Server configuration error",
            ErrorKind::InvalidRequest => "Invalid request",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::CityNotFound => "City not found",
            ErrorKind::UpstreamError => "Weather service error",
            ErrorKind::ServiceUnavailable => "Service unavailable",
            ErrorKind::UpstreamShapeError => "Bad upstream response",
            ErrorKind::InternalError => "Internal server error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed core request.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("City name is required")]
    Validation,

    #[error("API key not configured")]
    Configuration,

    #[error("{message}")]
    InvalidRequest { message: String },

    #[error("Invalid API key")]
    Unauthorized,

    #[error("No weather data found for city '{city}'")]
    CityNotFound { city: String },

    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    #[error("{0}")]
    ServiceUnavailable(NetworkFailure),

    #[error("The weather service returned an unexpected response")]
    UpstreamShape { debug: Option<String> },

    #[error("An unexpected error occurred")]
    Internal { debug: Option<String> },
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation => ErrorKind::ValidationError,
            ApiError::Configuration => ErrorKind::ConfigurationError,
            ApiError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            ApiError::Unauthorized => ErrorKind::Unauthorized,
            ApiError::CityNotFound { .. } => ErrorKind::CityNotFound,
            ApiError::Upstream { .. } => ErrorKind::UpstreamError,
            ApiError::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
            ApiError::UpstreamShape { .. } => ErrorKind::UpstreamShapeError,
            ApiError::Internal { .. } => ErrorKind::InternalError,
        }
    }

    /// HTTP status served to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation => StatusCode::BAD_REQUEST,
            ApiError::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::CityNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Upstream { status, .. } => *status,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::UpstreamShape { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Status the upstream answered with, when the failure came from an upstream response.
    pub fn upstream_status(&self) -> Option<StatusCode> {
        match self {
            ApiError::InvalidRequest { .. } => Some(StatusCode::BAD_REQUEST),
            ApiError::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            ApiError::CityNotFound { .. } => Some(StatusCode::NOT_FOUND),
            ApiError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn help(&self) -> Option<&'static str> {
        match self {
            ApiError::Validation => Some("Provide a city name, e.g. /api/weather/london"),
            ApiError::Configuration => Some(
                "Set the WEATHER_API_KEY environment variable or run `weather-server configure`",
            ),
            ApiError::Unauthorized => {
                Some("Check that your WeatherAPI.com API key is valid and active")
            }
            ApiError::CityNotFound { .. } => {
                Some("Check the spelling of the city name or try a nearby larger city")
            }
            ApiError::ServiceUnavailable(failure) => Some(failure.help()),
            _ => None,
        }
    }

    pub fn debug_detail(&self) -> Option<&str> {
        match self {
            ApiError::UpstreamShape { debug } | ApiError::Internal { debug } => debug.as_deref(),
            _ => None,
        }
    }

    /// Render the JSON error body. `debug` is only filled when `expose_details` is set.
    pub fn body(&self, expose_details: bool) -> ErrorBody {
        ErrorBody {
            error: self.kind().label(),
            message: self.to_string(),
            city: match self {
                ApiError::CityNotFound { city } => Some(city.clone()),
                _ => None,
            },
            help: self.help(),
            status: self.upstream_status().map(|s| s.as_u16()),
            debug: if expose_details { self.debug_detail().map(str::to_owned) } else { None },
        }
    }
}

impl From<ShapeError> for ApiError {
    fn from(err: ShapeError) -> Self {
        ApiError::UpstreamShape { debug: Some(err.0) }
    }
}

/// Wire form of [`ApiError`]: `{ error, message, [city], [help], [status], [debug] }`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<String>,
}

/// Map a failed upstream call onto the local taxonomy.
pub fn classify(failure: UpstreamFailure, query: &WeatherQuery) -> ApiError {
    match failure {
        UpstreamFailure::Status { status, body } => {
            let upstream_message = body.as_ref().and_then(upstream_message);

            match status.as_u16() {
                400 => ApiError::InvalidRequest {
                    message: upstream_message
                        .unwrap_or("Invalid city name or request parameters")
                        .to_string(),
                },
                401 => ApiError::Unauthorized,
                404 => ApiError::CityNotFound { city: query.city().to_string() },
                code if status.is_client_error() || status.is_server_error() => {
                    ApiError::Upstream {
                        status,
                        message: upstream_message.map(str::to_owned).unwrap_or_else(|| {
                            format!("Weather service responded with HTTP {code}")
                        }),
                    }
                }
                _ => ApiError::Internal {
                    debug: Some(format!("unexpected upstream status {status}")),
                },
            }
        }
        UpstreamFailure::Network(failure) => ApiError::ServiceUnavailable(failure),
        UpstreamFailure::MalformedBody(detail) => ApiError::UpstreamShape { debug: Some(detail) },
        UpstreamFailure::Other(detail) => ApiError::Internal { debug: Some(detail) },
    }
}

/// Extracts `error.message` (WeatherAPI.com envelope) or a top-level `message`.
fn upstream_message(body: &serde_json::Value) -> Option<&str> {
    body.pointer("/error/message")
        .or_else(|| body.get("message"))
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
}
