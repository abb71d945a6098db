use std::time::Duration;

use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};

use skycast_core::Config;
use skycast_server::{configure, AppState, Job, RateLimiter, ScheduleEntry};
use skycast_services::{HistoryClient, MailSender, SearchHistoryStore};
use skycast_weather::WeatherProvider;

#[actix_web::main]
async fn main() -> Result<()> {
    skycast_core::init()?;
    let (config, _validation) = Config::load_validated()?;

    let store = SearchHistoryStore::open(&config.database.path).with_context(|| {
        format!(
            "Failed to open history database at {}",
            config.database.path.display()
        )
    })?;
    let history = HistoryClient::new(store);

    let provider = WeatherProvider::new(
        config.weather.base_url.clone(),
        config.weather.api_key.clone(),
    )?;

    let mut schedule = Vec::new();
    if config.stats.interval_minutes > 0 {
        let mailer = MailSender::smtp(
            &config.mail.smtp_host,
            &config.mail.smtp_username,
            &config.mail.smtp_password,
            config.mail.from_address.clone(),
            config.mail.admin_address.clone(),
        )?;
        schedule.push(ScheduleEntry {
            name: "send-daily-weather-stats".to_string(),
            every: Duration::from_secs(config.stats.interval_minutes * 60),
            job: Job::DailyStats {
                history: history.clone(),
                mailer,
            },
        });
    }
    skycast_server::scheduler::spawn_all(schedule);

    let state = web::Data::new(AppState {
        history,
        provider,
        throttle: RateLimiter::new(
            config.throttle.max_requests,
            Duration::from_secs(config.throttle.window_seconds),
        ),
    });

    tracing::info!("Listening on {}", config.server.bind_address);
    HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
        .bind(&config.server.bind_address)
        .with_context(|| format!("Failed to bind {}", config.server.bind_address))?
        .run()
        .await?;

    Ok(())
}
