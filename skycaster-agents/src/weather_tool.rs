use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use skycaster_llm_sdk::tools::ToolCall;
use skycaster_weather::{Coordinates, WeatherProvider, WeatherReport};
use std::sync::Arc;
use std::time::Instant;

use crate::error::AgentError;

/// Name of the single tool the model is offered
pub const GET_WEATHER: &str = "get_weather";

/// Parameters of the `get_weather` tool as declared to the model
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetWeatherParams {
    /// City name, e.g. "Minneapolis, MN"
    pub city: String,
    /// Latitude in decimal degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    /// Longitude in decimal degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

/// Arguments of a tool call, split by whether they parsed
#[derive(Debug, Clone, PartialEq)]
pub enum ToolArguments {
    Parsed(Map<String, Value>),
    Malformed { raw: String, reason: String },
}

impl ToolArguments {
    pub fn from_call(call: &ToolCall) -> Self {
        match call.json_arguments() {
            Ok(Value::Object(map)) => Self::Parsed(map),
            Ok(other) => Self::Malformed {
                raw: call.raw_arguments().to_string(),
                reason: format!("expected a JSON object, got {}", json_kind(&other)),
            },
            Err(e) => Self::Malformed {
                raw: call.raw_arguments().to_string(),
                reason: e.to_string(),
            },
        }
    }

    /// The parsed map, or an empty one when the payload was malformed
    pub fn into_map(self) -> Map<String, Value> {
        match self {
            Self::Parsed(map) => map,
            Self::Malformed { raw, reason } => {
                tracing::warn!(raw = %raw, reason = %reason, "Ignoring malformed tool arguments");
                Map::new()
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Arguments actually handed to the weather provider
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocationArgs {
    pub city: String,
    pub coordinates: Option<Coordinates>,
}

impl ToolInvocationArgs {
    /// Merge the model's arguments with locally resolved defaults.
    ///
    /// A non-blank `city` from the model wins over `resolved_city`.
    /// Coordinates come from the model only when it sent both `lat` and `lon`
    /// as numbers, otherwise from `default_coordinates`.
    pub fn reconcile(
        arguments: ToolArguments,
        resolved_city: &str,
        default_coordinates: Option<Coordinates>,
    ) -> Result<Self, AgentError> {
        let map = arguments.into_map();

        let city = map
            .get("city")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|city| !city.is_empty())
            .unwrap_or_else(|| resolved_city.trim())
            .to_string();

        if city.is_empty() {
            return Err(AgentError::InvalidToolArguments(
                "no city available for weather lookup".to_string(),
            ));
        }

        let payload_coordinates = Coordinates::from_parts(
            map.get("lat").and_then(Value::as_f64),
            map.get("lon").and_then(Value::as_f64),
        );

        Ok(Self {
            city,
            coordinates: payload_coordinates.or(default_coordinates),
        })
    }
}

/// The weather payload the model sees. Always exactly these five fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub city: String,
    pub temp_f: Option<i64>,
    pub condition: String,
    pub precip_prob: Option<u32>,
    pub when: String,
}

impl WeatherReading {
    pub fn from_report(report: WeatherReport) -> Result<Self, AgentError> {
        let city = report.city.trim();
        if city.is_empty() {
            return Err(AgentError::UnusableReading(
                "provider returned a report without a city".to_string(),
            ));
        }

        let condition = match report.temp_f {
            Some(_) if !report.condition.trim().is_empty() => report.condition.clone(),
            _ => "unknown".to_string(),
        };

        Ok(Self {
            city: city.to_string(),
            temp_f: report.temp_f,
            condition,
            precip_prob: report.precip_prob,
            when: report
                .when
                .filter(|when| !when.trim().is_empty())
                .unwrap_or_else(|| "today".to_string()),
        })
    }
}

/// Adapter between the tool call and the weather provider
#[derive(Clone)]
pub struct WeatherTool {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherTool {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn invoke(&self, args: &ToolInvocationArgs) -> Result<WeatherReading, AgentError> {
        let start = Instant::now();

        let report = self
            .provider
            .get_weather(&args.city, args.coordinates)
            .await?;
        let reading = WeatherReading::from_report(report)?;

        tracing::info!(
            "Tool {} for {} via {} completed in {}ms",
            GET_WEATHER,
            args.city,
            self.provider.name(),
            start.elapsed().as_millis()
        );

        Ok(reading)
    }
}
