use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A latitude/longitude pair. Coordinates only ever travel together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build coordinates only when both halves are present
    pub fn from_parts(lat: Option<f64>, lon: Option<f64>) -> Option<Self> {
        match (lat, lon) {
            (Some(lat), Some(lon)) => Some(Self { lat, lon }),
            _ => None,
        }
    }
}

/// A weather report as a provider produced it.
///
/// `provider_fields` holds provider-internal data (resolved coordinates,
/// source name, ...) that callers are expected to drop before handing the
/// report to anyone else.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub city: String,
    pub temp_f: Option<i64>,
    pub condition: String,
    pub precip_prob: Option<u32>,
    pub when: Option<String>,
    pub provider_fields: BTreeMap<String, serde_json::Value>,
}

impl WeatherReport {
    /// The deterministic reading used whenever live data is unavailable
    pub fn mock(city: impl Into<String>) -> Self {
        let mut provider_fields = BTreeMap::new();
        provider_fields.insert("source".to_string(), serde_json::json!("mock"));

        Self {
            city: city.into(),
            temp_f: Some(60),
            condition: "cloudy".to_string(),
            precip_prob: Some(10),
            when: Some("today".to_string()),
            provider_fields,
        }
    }
}
