//! Open-Meteo integration (<https://open-meteo.com>): free geocoding and
//! forecast APIs, no key required.

pub mod client;
mod types;

pub use client::OpenMeteoClient;

/// Convert a Celsius reading to whole degrees Fahrenheit.
///
/// Halfway values round to the even neighbour.
pub fn fahrenheit_from_celsius(celsius: f64) -> i64 {
    (celsius * 9.0 / 5.0 + 32.0).round_ties_even() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fahrenheit_conversion() {
        assert_eq!(fahrenheit_from_celsius(15.6), 60);
        assert_eq!(fahrenheit_from_celsius(0.0), 32);
        assert_eq!(fahrenheit_from_celsius(-40.0), -40);
        assert_eq!(fahrenheit_from_celsius(100.0), 212);
    }

    #[test]
    fn test_fahrenheit_conversion_ties_round_to_even() {
        // 2.5°C -> 36.5°F, -17.5°C -> 0.5°F
        assert_eq!(fahrenheit_from_celsius(2.5), 36);
        assert_eq!(fahrenheit_from_celsius(-17.5), 0);
    }
}
