//! Request handlers for the weather and history endpoints.

use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

use skycast_weather::{Observation, WeatherError};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    city: Option<String>,
}

/// Response body for a successful weather lookup.
#[derive(Debug, Serialize)]
struct WeatherResponse {
    city: String,
    temperature: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
    weather: String,
    description: String,
    wind_speed: f64,
    timestamp: i64,
}

impl WeatherResponse {
    fn new(city: &str, observation: Observation) -> Self {
        Self {
            city: city.to_string(),
            temperature: observation.temperature,
            feels_like: observation.feels_like,
            humidity: observation.humidity,
            pressure: observation.pressure,
            weather: observation.condition,
            description: observation.description,
            wind_speed: observation.wind_speed,
            timestamp: observation.observed_at,
        }
    }
}

/// `GET /weather/?city=<name>`
///
/// Throttle check first, then parameter validation, then a single gateway
/// call. A history record is written if and only if the lookup succeeded.
pub async fn get_weather(
    req: HttpRequest,
    query: web::Query<WeatherQuery>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let client_key = client_key(&req);
    if !state.throttle.check(&client_key) {
        tracing::warn!("Request throttled for client {}", client_key);
        return HttpResponse::TooManyRequests().json(json!({"error": "Request was throttled"}));
    }

    tracing::info!("Weather request for city: {:?}", query.city);
    let Some(city) = query.city.as_deref().filter(|c| !c.is_empty()) else {
        tracing::warn!("Missing city parameter");
        return HttpResponse::BadRequest().json(json!({"error": "City parameter is required"}));
    };

    match state.provider.fetch_current(city).await {
        Ok(observation) => {
            // The record carries the city exactly as the caller sent it, not
            // the upstream-normalized name.
            if let Err(e) = state.history.record_search(city).await {
                tracing::error!("Failed to record search for {}: {}", city, e);
                return HttpResponse::InternalServerError()
                    .json(json!({"error": "Failed to record search"}));
            }
            HttpResponse::Ok().json(WeatherResponse::new(city, observation))
        }
        Err(WeatherError::CityNotFound(_)) => {
            HttpResponse::NotFound().json(json!({"error": format!("City '{city}' not found")}))
        }
        Err(WeatherError::Upstream(code)) => {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY);
            HttpResponse::build(status).json(json!({"error": "Weather API error"}))
        }
        Err(err @ WeatherError::Connection(_)) => {
            tracing::error!("API connection failed: {}", err);
            HttpResponse::InternalServerError().json(json!({"error": err.to_string()}))
        }
        Err(WeatherError::Malformed(detail)) => {
            tracing::error!("Malformed upstream response: {}", detail);
            HttpResponse::BadGateway()
                .json(json!({"error": "Malformed weather service response"}))
        }
    }
}

/// `GET /history/`
///
/// Full search history, most recent first.
pub async fn get_history(state: web::Data<AppState>) -> HttpResponse {
    match state.history.list_all().await {
        Ok(records) => HttpResponse::Ok().json(records),
        Err(e) => {
            tracing::error!("Failed to load search history: {}", e);
            HttpResponse::InternalServerError()
                .json(json!({"error": "Failed to load search history"}))
        }
    }
}

fn client_key(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}
