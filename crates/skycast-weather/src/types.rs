use serde::{Deserialize, Serialize};

/// Current conditions for one city, as reported by the upstream provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Temperature in degrees Celsius
    pub temperature: f64,
    /// Apparent temperature in degrees Celsius
    pub feels_like: f64,
    /// Relative humidity in percent (0-100)
    pub humidity: u8,
    /// Atmospheric pressure in hPa
    pub pressure: u32,
    /// Primary condition, e.g. "Clear"
    pub condition: String,
    /// Condition description, e.g. "clear sky"
    pub description: String,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Observation time as unix seconds
    pub observed_at: i64,
}

/// Weather gateway errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("City '{0}' not found")]
    CityNotFound(String),

    #[error("Weather provider returned status {0}")]
    Upstream(u16),

    #[error("Failed to connect to weather service: {0}")]
    Connection(#[source] reqwest::Error),

    #[error("Malformed weather provider response: {0}")]
    Malformed(String),
}
