//! HTTP surface for the weather lookup service.

pub mod handlers;
pub mod scheduler;
pub mod state;
pub mod throttle;

pub use scheduler::{Job, ScheduleEntry};
pub use state::AppState;
pub use throttle::RateLimiter;

use actix_web::web;

/// Register the service routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/weather/", web::get().to(handlers::get_weather))
        .route("/history/", web::get().to(handlers::get_history));
}
