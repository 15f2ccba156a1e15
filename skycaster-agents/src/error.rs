use skycaster_llm_sdk::error::LlmError;
use skycaster_weather::WeatherError;
use thiserror::Error;

/// Failures that end a single weather turn
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Completion request failed: {0}")]
    Completion(#[from] LlmError),

    #[error("Weather lookup failed: {0}")]
    Weather(#[from] WeatherError),

    #[error("Weather provider returned an unusable reading: {0}")]
    UnusableReading(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidToolArguments(String),

    #[error("Failed to serialize tool result: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid city pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl AgentError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Short, user-safe name of what failed
    pub fn category(&self) -> &'static str {
        match self {
            AgentError::Completion(_) => "language model unavailable",
            AgentError::Weather(_) | AgentError::UnusableReading(_) => "weather data unavailable",
            AgentError::InvalidToolArguments(_) => "invalid tool request",
            AgentError::Serialization(_) => "internal error",
            AgentError::Config(_) | AgentError::Pattern(_) => "configuration error",
        }
    }
}
