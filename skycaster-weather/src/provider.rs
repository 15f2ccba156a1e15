use async_trait::async_trait;

use crate::types::{Coordinates, WeatherReport};
use crate::weather_error::WeatherError;

/// Source of weather reports for a city
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch a report for `city`, using `coordinates` when the caller has them
    async fn get_weather(
        &self,
        city: &str,
        coordinates: Option<Coordinates>,
    ) -> Result<WeatherReport, WeatherError>;

    /// Short provider name for logs
    fn name(&self) -> &str;
}
