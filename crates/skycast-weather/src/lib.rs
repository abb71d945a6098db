//! Gateway to the upstream weather provider.
//!
//! Issues a single synchronous lookup per request against an
//! OpenWeather-compatible current-weather API and maps the outcome onto
//! [`WeatherError`] variants.

pub mod provider;
pub mod types;

pub use provider::WeatherProvider;
pub use types::{Observation, WeatherError};
