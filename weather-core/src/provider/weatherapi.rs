use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::{error::Error as StdError, io, time::Duration};
use tracing::{debug, instrument};

use crate::{
    config::UpstreamConfig,
    model::{AirQuality, UpstreamPayload, WeatherQuery},
};

use super::{NetworkFailure, UpstreamFailure, WeatherProvider};

/// Live client for WeatherAPI.com's `current.json` endpoint.
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    base_url: String,
    http: Client,
}

impl WeatherApiClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client for WeatherAPI.com")?;

        Ok(Self { base_url: config.base_url.trim_end_matches('/').to_string(), http })
    }

    fn current_url(&self) -> String {
        format!("{}/current.json", self.base_url)
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiClient {
    #[instrument(
        skip(self, query, api_key, air_quality),
        fields(city = %query.city(), aqi = air_quality.as_param())
    )]
    async fn current(
        &self,
        query: &WeatherQuery,
        api_key: &str,
        air_quality: AirQuality,
    ) -> Result<UpstreamPayload, UpstreamFailure> {
        let url = self.current_url();
        debug!(url = %url, "Fetching current conditions");

        let res = self
            .http
            .get(&url)
            .query(&[("key", api_key), ("q", query.city()), ("aqi", air_quality.as_param())])
            .send()
            .await
            .map_err(|e| classify_transport_error(&e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| classify_transport_error(&e))?;

        if !status.is_success() {
            debug!(%status, body = %truncate_body(&body), "WeatherAPI returned an error status");
            return Err(UpstreamFailure::Status { status, body: serde_json::from_str(&body).ok() });
        }

        let value: Value = serde_json::from_str(&body).map_err(|e| {
            UpstreamFailure::MalformedBody(format!("{e}; body: {}", truncate_body(&body)))
        })?;

        Ok(UpstreamPayload::new(value))
    }
}

/// Sort a reqwest failure into a network sub-case, or `Other` if a response was in flight.
fn classify_transport_error(err: &reqwest::Error) -> UpstreamFailure {
    if err.is_timeout() {
        return NetworkFailure::Timeout.into();
    }
    if err.is_connect() {
        return classify_connect_error(err).into();
    }

    UpstreamFailure::Other(err.to_string())
}

fn classify_connect_error(err: &(dyn StdError + 'static)) -> NetworkFailure {
    let mut current = Some(err);

    while let Some(e) = current {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            match io_err.kind() {
                io::ErrorKind::ConnectionRefused => return NetworkFailure::ConnectionRefused,
                io::ErrorKind::TimedOut => return NetworkFailure::Timeout,
                _ => {}
            }
        }

        let text = e.to_string().to_lowercase();
        if text.contains("connection refused") {
            return NetworkFailure::ConnectionRefused;
        }
        if text.contains("dns error")
            || text.contains("failed to lookup address")
            || text.contains("name or service not known")
            || text.contains("no such host")
        {
            return NetworkFailure::HostNotFound;
        }

        current = e.source();
    }

    NetworkFailure::HostUnreachable
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Wrapped {
        msg: &'static str,
        source: Option<io::Error>,
    }

    impl std::fmt::Display for Wrapped {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.msg)
        }
    }

    impl StdError for Wrapped {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.source.as_ref().map(|e| e as &(dyn StdError + 'static))
        }
    }

    #[test]
    fn refused_io_source_is_connection_refused() {
        let err = Wrapped {
            msg: "client error (Connect)",
            source: Some(io::Error::from(io::ErrorKind::ConnectionRefused)),
        };

        assert_eq!(classify_connect_error(&err), NetworkFailure::ConnectionRefused);
    }

    #[test]
    fn dns_failure_is_host_not_found() {
        let err = Wrapped {
            msg: "dns error: failed to lookup address information: Name or service not known",
            source: None,
        };

        assert_eq!(classify_connect_error(&err), NetworkFailure::HostNotFound);
    }

    #[test]
    fn unknown_connect_failure_is_host_unreachable() {
        let err = Wrapped {
            msg: "client error (Connect)",
            source: Some(io::Error::other("network is unreachable")),
        };

        assert_eq!(classify_connect_error(&err), NetworkFailure::HostUnreachable);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let cfg = UpstreamConfig { base_url: "http://localhost:1234/v1/".into(), timeout_secs: 1 };
        let client = WeatherApiClient::new(&cfg).unwrap();

        assert_eq!(client.current_url(), "http://localhost:1234/v1/current.json");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let out = truncate_body(&long);

        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
