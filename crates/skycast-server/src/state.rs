use skycast_services::HistoryClient;
use skycast_weather::WeatherProvider;

use crate::throttle::RateLimiter;

/// Shared per-process state handed to every request handler.
pub struct AppState {
    /// Search history log
    pub history: HistoryClient,
    /// Upstream weather gateway
    pub provider: WeatherProvider,
    /// Anonymous rate throttle for the weather endpoint
    pub throttle: RateLimiter,
}
