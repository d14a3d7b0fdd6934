use std::sync::Arc;
use tracing::{debug, instrument};

use crate::{
    config::Config,
    error::{ApiError, classify},
    model::{AirQuality, NormalizedWeather, WeatherQuery},
    normalize::normalize,
    provider::{WeatherApiClient, WeatherProvider},
};

/// Validates a city lookup, performs the single upstream call and normalizes the result.
///
/// Holds only immutable state, so one instance is shared by every request.
#[derive(Debug, Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    api_key: Option<String>,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>, api_key: Option<String>) -> Self {
        let api_key = api_key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty());
        Self { provider, api_key }
    }

    /// Build a service backed by the live WeatherAPI.com client.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = WeatherApiClient::new(&config.upstream)?;
        Ok(Self::new(Arc::new(client), config.api_key().map(str::to_owned)))
    }

    pub fn api_key_configured(&self) -> bool {
        self.api_key.is_some()
    }

    #[instrument(skip(self))]
    pub async fn current_weather(&self, city: &str) -> Result<NormalizedWeather, ApiError> {
        let query = WeatherQuery::try_from(city)?;
        let api_key = self.api_key.as_deref().ok_or(ApiError::Configuration)?;

        let payload = self
            .provider
            .current(&query, api_key, AirQuality::Exclude)
            .await
            .map_err(|failure| {
                debug!(error = %failure, "Upstream call failed");
                classify(failure, &query)
            })?;

        Ok(normalize(&payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ErrorKind,
        model::UpstreamPayload,
        normalize::tests::london_payload,
        provider::{NetworkFailure, UpstreamFailure},
    };
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    /// Replies with a canned outcome and records every call it receives.
    #[derive(Debug)]
    struct RecordingProvider {
        outcome: Result<serde_json::Value, UpstreamFailure>,
        calls: Mutex<Vec<(String, String, AirQuality)>>,
    }

    impl RecordingProvider {
        fn replying(outcome: Result<serde_json::Value, UpstreamFailure>) -> Arc<Self> {
            Arc::new(Self { outcome, calls: Mutex::new(Vec::new()) })
        }

        fn calls(&self) -> Vec<(String, String, AirQuality)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WeatherProvider for RecordingProvider {
        async fn current(
            &self,
            query: &WeatherQuery,
            api_key: &str,
            air_quality: AirQuality,
        ) -> Result<UpstreamPayload, UpstreamFailure> {
            self.calls.lock().unwrap().push((
                query.city().to_string(),
                api_key.to_string(),
                air_quality,
            ));
            self.outcome.clone().map(UpstreamPayload::new)
        }
    }

    fn service(provider: &Arc<RecordingProvider>, key: Option<&str>) -> WeatherService {
        WeatherService::new(provider.clone(), key.map(str::to_owned))
    }

    #[tokio::test]
    async fn success_passes_trimmed_city_and_no_air_quality() {
        let provider = RecordingProvider::replying(Ok(london_payload()));
        let svc = service(&provider, Some("KEY"));

        let weather = svc.current_weather("  London ").await.unwrap();

        assert_eq!(weather.location.name, "London");
        assert_eq!(
            provider.calls(),
            vec![(String::from("London"), String::from("KEY"), AirQuality::Exclude)]
        );
    }

    #[tokio::test]
    async fn blank_city_never_reaches_upstream() {
        let provider = RecordingProvider::replying(Ok(london_payload()));
        let svc = service(&provider, Some("KEY"));

        for city in ["", "   "] {
            let err = svc.current_weather(city).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValidationError);
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_api_key_never_reaches_upstream() {
        let provider = RecordingProvider::replying(Ok(london_payload()));

        for key in [None, Some(""), Some("  ")] {
            let svc = service(&provider, key);
            assert!(!svc.api_key_configured());

            let err = svc.current_weather("london").await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ConfigurationError);
            assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn blank_city_is_reported_before_missing_key() {
        let provider = RecordingProvider::replying(Ok(london_payload()));
        let svc = service(&provider, None);

        let err = svc.current_weather(" ").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }

    #[tokio::test]
    async fn upstream_404_becomes_city_not_found() {
        let provider = RecordingProvider::replying(Err(UpstreamFailure::Status {
            status: StatusCode::NOT_FOUND,
            body: None,
        }));
        let svc = service(&provider, Some("KEY"));

        let err = svc.current_weather("atlantis").await.unwrap_err();
        assert_eq!(err, ApiError::CityNotFound { city: "atlantis".into() });
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn network_failure_is_not_retried() {
        let provider =
            RecordingProvider::replying(Err(NetworkFailure::ConnectionRefused.into()));
        let svc = service(&provider, Some("KEY"));

        let err = svc.current_weather("london").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn malformed_payload_fails_instead_of_partial_success() {
        let mut payload = london_payload();
        payload["current"].as_object_mut().unwrap().remove("uv");
        let provider = RecordingProvider::replying(Ok(payload));
        let svc = service(&provider, Some("KEY"));

        let err = svc.current_weather("london").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamShapeError);
    }

    #[tokio::test]
    async fn repeated_queries_are_structurally_identical() {
        let provider = RecordingProvider::replying(Ok(london_payload()));
        let svc = service(&provider, Some("KEY"));

        let first = svc.current_weather("london").await.unwrap();
        let second = svc.current_weather("london").await.unwrap();
        assert_eq!(first, second);
    }
}
