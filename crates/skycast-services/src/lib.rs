pub mod history;
pub mod history_client;
pub mod mail;
pub mod stats;

pub use history::{CityCount, HistoryError, HistoryResult, SearchHistoryStore, SearchRecord};
pub use history_client::HistoryClient;
pub use mail::{MailError, MailSender, OutboundEmail};
pub use stats::{run_daily_stats, DailyStats, StatsError};
