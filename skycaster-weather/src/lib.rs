pub mod open_meteo;
pub mod provider;
pub mod service;
pub mod types;
pub mod weather_error;

pub use open_meteo::{fahrenheit_from_celsius, OpenMeteoClient};
pub use provider::WeatherProvider;
pub use service::{WeatherMode, WeatherService};
pub use types::{Coordinates, WeatherReport};
pub use weather_error::WeatherError;
