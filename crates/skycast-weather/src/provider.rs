use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::types::{Observation, WeatherError};

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Wire shape of the upstream current-weather response.
///
/// Every field here is required; a success response missing any of them is
/// reported as [`WeatherError::Malformed`].
#[derive(Debug, Deserialize)]
struct UpstreamResponse {
    main: UpstreamMain,
    weather: Vec<UpstreamCondition>,
    wind: UpstreamWind,
    dt: i64,
}

#[derive(Debug, Deserialize)]
struct UpstreamMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct UpstreamCondition {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct UpstreamWind {
    speed: f64,
}

impl UpstreamResponse {
    fn into_observation(self) -> Result<Observation, WeatherError> {
        // The provider sends conditions as a list; the first entry is primary.
        let condition = self
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::Malformed("empty weather condition list".to_string()))?;

        Ok(Observation {
            temperature: self.main.temp,
            feels_like: self.main.feels_like,
            humidity: self.main.humidity,
            pressure: self.main.pressure,
            condition: condition.main,
            description: condition.description,
            wind_speed: self.wind.speed,
            observed_at: self.dt,
        })
    }
}

/// Client for the upstream weather provider.
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WeatherProvider {
    /// Create a provider pointed at `base_url` with the given API key.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(WeatherError::Connection)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Fetch current conditions for `city` with a single upstream request.
    ///
    /// Metric units are requested unconditionally. No retries.
    pub async fn fetch_current(&self, city: &str) -> Result<Observation, WeatherError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(WeatherError::Connection)?;

        match response.status() {
            StatusCode::OK => {
                let body: UpstreamResponse = response
                    .json()
                    .await
                    .map_err(|e| WeatherError::Malformed(e.to_string()))?;
                tracing::info!("Weather data retrieved for {}", city);
                body.into_observation()
            }
            StatusCode::NOT_FOUND => {
                tracing::warn!("City not found: {}", city);
                Err(WeatherError::CityNotFound(city.to_string()))
            }
            status => {
                tracing::error!("Weather API error: {}", status);
                Err(WeatherError::Upstream(status.as_u16()))
            }
        }
    }
}
