use std::collections::BTreeMap;
use std::time::Duration;

use serde::de::DeserializeOwned;

use super::fahrenheit_from_celsius;
use super::types::{ForecastResponse, GeocodingResponse};
use crate::types::{Coordinates, WeatherReport};
use crate::weather_error::WeatherError;

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com";
const FORECAST_URL: &str = "https://api.open-meteo.com";
const GEOCODING_TIMEOUT: Duration = Duration::from_secs(10);
const FORECAST_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client for the Open-Meteo geocoding and forecast APIs.
///
/// Each request carries its own timeout and is never retried.
pub struct OpenMeteoClient {
    geocoding_url: String,
    forecast_url: String,
    http_client: reqwest::Client,
}

impl OpenMeteoClient {
    pub fn new() -> Result<Self, WeatherError> {
        let http_client = reqwest::Client::builder()
            .timeout(FORECAST_TIMEOUT)
            .build()?;

        Ok(Self {
            geocoding_url: GEOCODING_URL.to_string(),
            forecast_url: FORECAST_URL.to_string(),
            http_client,
        })
    }

    /// Point both APIs at other hosts (used by tests)
    pub fn with_base_urls(
        mut self,
        geocoding_url: impl Into<String>,
        forecast_url: impl Into<String>,
    ) -> Self {
        self.geocoding_url = geocoding_url.into();
        self.forecast_url = forecast_url.into();
        self
    }

    /// Look up coordinates for a city name. `Ok(None)` when nothing matched.
    pub async fn geocode(&self, city: &str) -> Result<Option<Coordinates>, WeatherError> {
        let url = format!("{}/v1/search", self.geocoding_url);
        let request = self
            .http_client
            .get(&url)
            .query(&[("name", city), ("count", "1")])
            .timeout(GEOCODING_TIMEOUT);

        let response: GeocodingResponse = self.fetch_json(request, &url).await?;

        let coordinates = response
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|result| Coordinates::from_parts(result.latitude, result.longitude));

        tracing::debug!(city, ?coordinates, "Geocoded city");
        Ok(coordinates)
    }

    /// Current temperature and hourly precipitation chance at `coordinates`
    pub async fn forecast(
        &self,
        city: &str,
        coordinates: Coordinates,
    ) -> Result<WeatherReport, WeatherError> {
        let url = format!("{}/v1/forecast", self.forecast_url);
        let request = self
            .http_client
            .get(&url)
            .query(&[
                ("latitude", coordinates.lat.to_string()),
                ("longitude", coordinates.lon.to_string()),
                ("current_weather", "true".to_string()),
                ("hourly", "precipitation_probability".to_string()),
            ])
            .timeout(FORECAST_TIMEOUT);

        let response: ForecastResponse = self.fetch_json(request, &url).await?;
        Ok(report_from_forecast(city, coordinates, response))
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<T, WeatherError> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| WeatherError::parse(e.to_string()))
    }
}

fn report_from_forecast(
    city: &str,
    coordinates: Coordinates,
    response: ForecastResponse,
) -> WeatherReport {
    let temp_f = response
        .current_weather
        .and_then(|current| current.temperature)
        .map(fahrenheit_from_celsius);

    let precip_prob = response
        .hourly
        .and_then(|hourly| hourly.precipitation_probability)
        .and_then(|probabilities| probabilities.into_iter().flatten().next())
        .map(|probability| probability.round().clamp(0.0, 100.0) as u32);

    let condition = if temp_f.is_some() {
        "partly cloudy"
    } else {
        "unknown"
    };

    let mut provider_fields = BTreeMap::new();
    provider_fields.insert("source".to_string(), serde_json::json!("open-meteo"));
    provider_fields.insert("latitude".to_string(), serde_json::json!(coordinates.lat));
    provider_fields.insert("longitude".to_string(), serde_json::json!(coordinates.lon));

    WeatherReport {
        city: city.to_string(),
        temp_f,
        condition: condition.to_string(),
        precip_prob,
        when: Some("today".to_string()),
        provider_fields,
    }
}
