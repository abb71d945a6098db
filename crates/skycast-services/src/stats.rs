//! Daily search statistics: aggregation, report rendering, and delivery.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use thiserror::Error;

use crate::history::CityCount;
use crate::history_client::HistoryClient;
use crate::mail::{MailError, MailSender};

/// How many cities the report lists.
const TOP_CITIES: u32 = 5;

/// Errors from the daily statistics job.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Failed to collect statistics: {0}")]
    Collect(#[source] anyhow::Error),

    #[error("Failed to send statistics email: {0}")]
    Mail(#[from] MailError),
}

/// Aggregated search statistics for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub total_searches: u64,
    pub top_cities: Vec<CityCount>,
}

impl DailyStats {
    /// Aggregate statistics for `date` out of the history store.
    pub async fn collect(history: &HistoryClient, date: NaiveDate) -> Result<Self, StatsError> {
        let total_searches = history.count_on(date).await.map_err(StatsError::Collect)?;
        let top_cities = history
            .top_cities_on(date, TOP_CITIES)
            .await
            .map_err(StatsError::Collect)?;

        Ok(Self {
            date,
            total_searches,
            top_cities,
        })
    }

    /// Subject line for the report email.
    pub fn subject(&self) -> String {
        format!("Weather API Statistics for {}", self.date.format("%Y-%m-%d"))
    }

    /// Fixed-format plain-text report body.
    pub fn render(&self) -> String {
        let mut report = String::new();
        report.push_str("Daily Weather API Statistics\n");
        report.push_str("============================\n\n");
        report.push_str(&format!("Date: {}\n", self.date.format("%Y-%m-%d")));
        report.push_str(&format!("Total Searches: {}\n\n", self.total_searches));

        if self.top_cities.is_empty() {
            report.push_str("No searches were made yesterday\n");
        } else {
            report.push_str("Top Searched Cities:\n");
            for city in &self.top_cities {
                report.push_str(&format!(
                    "- {}: {} searches\n",
                    city.city_name, city.count
                ));
            }
        }

        report
    }
}

/// Run the daily statistics job once.
///
/// The target date is yesterday (UTC) relative to `now`. Mail failure is not
/// suppressed; it propagates so the scheduler can log the job as failed.
/// Returns a confirmation message for job-run logging.
pub async fn run_daily_stats(
    history: &HistoryClient,
    mailer: &MailSender,
    now: DateTime<Utc>,
) -> Result<String, StatsError> {
    let target_date = (now - Duration::days(1)).date_naive();

    let stats = DailyStats::collect(history, target_date).await?;
    mailer.send(&stats.subject(), &stats.render()).await?;

    Ok(format!(
        "Email sent with {} searches for {}",
        stats.total_searches,
        target_date.format("%Y-%m-%d")
    ))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::history::SearchHistoryStore;
    use chrono::TimeZone;

    fn test_history() -> HistoryClient {
        HistoryClient::new(SearchHistoryStore::in_memory().unwrap())
    }

    #[test]
    fn test_render_with_cities() {
        let stats = DailyStats {
            date: NaiveDate::from_ymd_opt(2026, 8, 29).unwrap(),
            total_searches: 5,
            top_cities: vec![
                CityCount {
                    city_name: "Paris".to_string(),
                    count: 3,
                },
                CityCount {
                    city_name: "Berlin".to_string(),
                    count: 2,
                },
            ],
        };

        let report = stats.render();
        assert!(report.starts_with("Daily Weather API Statistics\n"));
        assert!(report.contains("Date: 2026-08-29\n"));
        assert!(report.contains("Total Searches: 5\n"));
        assert!(report.contains("Top Searched Cities:\n"));
        let paris = report.find("- Paris: 3 searches").unwrap();
        let berlin = report.find("- Berlin: 2 searches").unwrap();
        assert!(paris < berlin);
        assert!(!report.contains("No searches were made yesterday"));
    }

    #[test]
    fn test_render_empty_day() {
        let stats = DailyStats {
            date: NaiveDate::from_ymd_opt(2026, 8, 29).unwrap(),
            total_searches: 0,
            top_cities: vec![],
        };

        let report = stats.render();
        assert!(report.contains("Total Searches: 0\n"));
        assert!(report.contains("No searches were made yesterday"));
        assert!(!report.contains("Top Searched Cities"));
    }

    #[test]
    fn test_subject_embeds_date() {
        let stats = DailyStats {
            date: NaiveDate::from_ymd_opt(2026, 8, 29).unwrap(),
            total_searches: 0,
            top_cities: vec![],
        };
        assert_eq!(stats.subject(), "Weather API Statistics for 2026-08-29");
    }

    #[tokio::test]
    async fn test_job_reports_yesterday_only() {
        let history = test_history();
        let now = Utc.with_ymd_and_hms(2026, 8, 30, 9, 0, 0).unwrap();
        let yesterday = now - Duration::days(1);
        let two_days_ago = now - Duration::days(2);

        for _ in 0..3 {
            history.record_search_at("Paris", yesterday).await.unwrap();
        }
        for _ in 0..2 {
            history.record_search_at("Berlin", yesterday).await.unwrap();
        }
        // Out of range, must not count
        history
            .record_search_at("London", two_days_ago)
            .await
            .unwrap();

        let (mailer, mailbox) = MailSender::memory("noreply@example.com", "admin@example.com");
        let confirmation = run_daily_stats(&history, &mailer, now).await.unwrap();

        assert_eq!(confirmation, "Email sent with 5 searches for 2026-08-29");

        let sent = mailbox.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Weather API Statistics for 2026-08-29");
        assert_eq!(sent[0].to, "admin@example.com");
        assert!(sent[0].body.contains("Total Searches: 5"));
        let paris = sent[0].body.find("- Paris: 3 searches").unwrap();
        let berlin = sent[0].body.find("- Berlin: 2 searches").unwrap();
        assert!(paris < berlin);
    }

    #[tokio::test]
    async fn test_job_with_no_searches_yesterday() {
        let history = test_history();
        let now = Utc.with_ymd_and_hms(2026, 8, 30, 9, 0, 0).unwrap();
        let two_days_ago = now - Duration::days(2);

        history
            .record_search_at("London", two_days_ago)
            .await
            .unwrap();

        let (mailer, mailbox) = MailSender::memory("noreply@example.com", "admin@example.com");
        let confirmation = run_daily_stats(&history, &mailer, now).await.unwrap();

        assert_eq!(confirmation, "Email sent with 0 searches for 2026-08-29");

        let sent = mailbox.lock();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.contains("Total Searches: 0"));
        assert!(sent[0].body.contains("No searches were made yesterday"));
    }
}
