use serde::Deserialize;
use skycaster_llm_sdk::models::openai::DEFAULT_MODEL_ID;
use skycaster_weather::{Coordinates, WeatherMode};
use std::collections::HashMap;
use std::path::Path;

use crate::error::AgentError;
use crate::orchestrator::TurnDefaults;

pub const DEFAULT_CITY: &str = "Minneapolis, MN";

/// Contents of an optional TOML config file
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub api_keys: HashMap<String, toml::Value>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub weather: WeatherSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct WeatherSection {
    pub default_city: Option<String>,
    pub default_lat: Option<f64>,
    pub default_lon: Option<f64>,
    pub live: Option<bool>,
}

impl ConfigFile {
    fn openai_api_key(&self) -> Option<String> {
        self.api_keys
            .get("openai_api_key")
            .and_then(|v| v.as_str())
            .or_else(|| self.api_keys.get("OPENAI_API_KEY").and_then(|v| v.as_str()))
            .map(|s| s.to_string())
    }
}

pub fn load_config(path: &Path) -> Result<ConfigFile, AgentError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AgentError::config(format!("Failed to read {}: {}", path.display(), e))
    })?;
    toml::from_str(&content)
        .map_err(|e| AgentError::config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Resolved application settings, built once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub openai_api_key: Option<String>,
    pub model: String,
    pub default_city: String,
    pub default_lat: Option<f64>,
    pub default_lon: Option<f64>,
    pub use_live_weather: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            model: DEFAULT_MODEL_ID.to_string(),
            default_city: DEFAULT_CITY.to_string(),
            default_lat: None,
            default_lon: None,
            use_live_weather: false,
        }
    }
}

impl AppConfig {
    /// Layer the config file and then environment variables over the defaults.
    /// `env` looks a variable up by name; empty values count as unset.
    pub fn resolve<F>(file: Option<&ConfigFile>, env: F) -> Result<Self, AgentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(file) = file {
            config.openai_api_key = file.openai_api_key();
            if let Some(model) = &file.model {
                config.model = model.clone();
            }
            if let Some(city) = &file.weather.default_city {
                config.default_city = city.clone();
            }
            config.default_lat = file.weather.default_lat;
            config.default_lon = file.weather.default_lon;
            config.use_live_weather = file.weather.live.unwrap_or(false);
        }

        let lookup = |name: &str| env(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = lookup("OPENAI_API_KEY") {
            config.openai_api_key = Some(key);
        }
        if let Some(model) = lookup("SKYCASTER_MODEL") {
            config.model = model;
        }
        if let Some(city) = lookup("DEFAULT_CITY") {
            config.default_city = city;
        }
        if let Some(lat) = lookup("DEFAULT_LAT") {
            config.default_lat = Some(parse_coordinate("DEFAULT_LAT", &lat)?);
        }
        if let Some(lon) = lookup("DEFAULT_LON") {
            config.default_lon = Some(parse_coordinate("DEFAULT_LON", &lon)?);
        }
        if let Some(live) = lookup("USE_LIVE_WEATHER") {
            config.use_live_weather = live.trim().eq_ignore_ascii_case("true");
        }

        config.validate()?;
        Ok(config)
    }

    /// Resolve against the process environment
    pub fn from_env(file: Option<&ConfigFile>) -> Result<Self, AgentError> {
        Self::resolve(file, |name| std::env::var(name).ok())
    }

    /// Apply command-line overrides, which take precedence over everything else
    pub fn with_overrides(
        mut self,
        city: Option<String>,
        model: Option<String>,
        live: bool,
    ) -> Result<Self, AgentError> {
        if let Some(city) = city {
            self.default_city = city;
        }
        if let Some(model) = model {
            self.model = model;
        }
        if live {
            self.use_live_weather = true;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn api_key(&self) -> Result<&str, AgentError> {
        self.openai_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AgentError::config(
                    "OpenAI API key not found. Set OPENAI_API_KEY or 'openai_api_key' in [api_keys]",
                )
            })
    }

    /// Default coordinates, present only when both halves are configured
    pub fn default_coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_parts(self.default_lat, self.default_lon)
    }

    pub fn weather_mode(&self) -> WeatherMode {
        WeatherMode::from_live_flag(self.use_live_weather)
    }

    pub fn turn_defaults(&self) -> TurnDefaults {
        TurnDefaults::new(self.default_city.clone(), self.default_coordinates())
    }

    fn validate(&self) -> Result<(), AgentError> {
        if self.default_city.trim().is_empty() {
            return Err(AgentError::config("Default city must not be empty"));
        }
        if self.model.trim().is_empty() {
            return Err(AgentError::config("Model must not be empty"));
        }
        Ok(())
    }
}

fn parse_coordinate(name: &str, value: &str) -> Result<f64, AgentError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| AgentError::config(format!("{} must be a number, got '{}'", name, value)))
}
