use async_trait::async_trait;
use std::time::Instant;

use crate::open_meteo::OpenMeteoClient;
use crate::provider::WeatherProvider;
use crate::types::{Coordinates, WeatherReport};
use crate::weather_error::WeatherError;

/// Whether to call the live weather APIs or answer with the mock reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeatherMode {
    #[default]
    Mock,
    Live,
}

impl WeatherMode {
    pub fn from_live_flag(live: bool) -> Self {
        if live {
            Self::Live
        } else {
            Self::Mock
        }
    }
}

/// Weather provider that degrades to the mock reading instead of failing.
///
/// In live mode the caller's coordinates are used when present, otherwise
/// the city is geocoded. Missing coordinates, a failed geocode or a failed
/// forecast all produce [`WeatherReport::mock`].
pub struct WeatherService {
    mode: WeatherMode,
    client: OpenMeteoClient,
}

impl WeatherService {
    pub fn new(mode: WeatherMode, client: OpenMeteoClient) -> Self {
        Self { mode, client }
    }

    /// Service backed by the public Open-Meteo endpoints
    pub fn open_meteo(mode: WeatherMode) -> Result<Self, WeatherError> {
        Ok(Self::new(mode, OpenMeteoClient::new()?))
    }

    async fn resolve_coordinates(
        &self,
        city: &str,
        coordinates: Option<Coordinates>,
    ) -> Option<Coordinates> {
        if coordinates.is_some() {
            return coordinates;
        }

        match self.client.geocode(city).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(city, error = %e, "Geocoding failed");
                None
            }
        }
    }

    async fn live_report(&self, city: &str, coordinates: Option<Coordinates>) -> WeatherReport {
        let Some(coordinates) = self.resolve_coordinates(city, coordinates).await else {
            tracing::warn!(city, "No coordinates for city, using mock weather");
            return WeatherReport::mock(city);
        };

        match self.client.forecast(city, coordinates).await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(city, error = %e, "Forecast lookup failed, using mock weather");
                WeatherReport::mock(city)
            }
        }
    }
}

#[async_trait]
impl WeatherProvider for WeatherService {
    async fn get_weather(
        &self,
        city: &str,
        coordinates: Option<Coordinates>,
    ) -> Result<WeatherReport, WeatherError> {
        let start = Instant::now();

        let report = match self.mode {
            WeatherMode::Mock => WeatherReport::mock(city),
            WeatherMode::Live => self.live_report(city, coordinates).await,
        };

        tracing::info!(
            "Weather lookup for {} ({:?}) completed in {}ms",
            city,
            self.mode,
            start.elapsed().as_millis()
        );

        Ok(report)
    }

    fn name(&self) -> &str {
        match self.mode {
            WeatherMode::Mock => "mock",
            WeatherMode::Live => "open-meteo",
        }
    }
}
