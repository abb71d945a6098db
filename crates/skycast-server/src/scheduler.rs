//! Background job scheduling.
//!
//! The schedule is an explicit table built once at startup and handed to
//! `spawn_all`; nothing registers jobs afterwards. Each entry runs on its own
//! tokio task. Job failures are logged and the schedule keeps running.

use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;

use skycast_services::{run_daily_stats, HistoryClient, MailSender};

/// A job the scheduler knows how to run.
#[derive(Clone)]
pub enum Job {
    /// Aggregate yesterday's searches and email the report.
    DailyStats {
        history: HistoryClient,
        mailer: MailSender,
    },
}

impl Job {
    /// Run the job once, returning its confirmation message.
    pub async fn run(&self) -> anyhow::Result<String> {
        match self {
            Self::DailyStats { history, mailer } => {
                Ok(run_daily_stats(history, mailer, Utc::now()).await?)
            }
        }
    }
}

/// One named entry in the schedule table.
pub struct ScheduleEntry {
    pub name: String,
    pub every: Duration,
    pub job: Job,
}

/// Spawn one recurring task per schedule entry.
///
/// The first interval tick fires immediately; it is skipped so jobs do not
/// run at startup. Missed ticks delay rather than burst.
pub fn spawn_all(entries: Vec<ScheduleEntry>) {
    for entry in entries {
        tracing::info!(
            "Scheduling job '{}' every {}s",
            entry.name,
            entry.every.as_secs()
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(entry.every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval.tick().await;

            loop {
                interval.tick().await;
                match entry.job.run().await {
                    Ok(confirmation) => {
                        tracing::info!("Job '{}' completed: {}", entry.name, confirmation);
                    }
                    Err(e) => {
                        tracing::error!("Job '{}' failed: {}", entry.name, e);
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use skycast_services::SearchHistoryStore;

    #[tokio::test]
    async fn test_daily_stats_job_runs_and_confirms() {
        let history = HistoryClient::new(SearchHistoryStore::in_memory().unwrap());
        let (mailer, mailbox) = MailSender::memory("noreply@example.com", "admin@example.com");

        let job = Job::DailyStats { history, mailer };
        let confirmation = job.run().await.unwrap();

        assert!(confirmation.starts_with("Email sent with 0 searches for "));
        assert_eq!(mailbox.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_scheduled_job_fires_on_interval() {
        let history = HistoryClient::new(SearchHistoryStore::in_memory().unwrap());
        let (mailer, mailbox) = MailSender::memory("noreply@example.com", "admin@example.com");

        spawn_all(vec![ScheduleEntry {
            name: "send-daily-weather-stats".to_string(),
            every: Duration::from_millis(20),
            job: Job::DailyStats { history, mailer },
        }]);

        tokio::time::sleep(Duration::from_millis(70)).await;
        assert!(!mailbox.lock().is_empty());
    }
}
