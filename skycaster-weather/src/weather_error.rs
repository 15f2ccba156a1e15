use thiserror::Error;

/// Failures talking to a weather data source
#[derive(Error, Debug)]
pub enum WeatherError {
    /// Connection failure or timeout
    #[error("Network error: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    /// The API answered with a non-success status
    #[error("Weather API returned status {status} for {url}")]
    Status { status: u16, url: String },

    /// The API answered with a body we could not read
    #[error("Failed to parse weather API response: {message}")]
    Parse { message: String },
}

impl WeatherError {
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }
}
