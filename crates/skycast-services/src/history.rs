//! SQLite-backed search history log.
//!
//! One row per successful weather lookup: the city string exactly as the
//! client sent it, plus the insert time. Rows are never updated or deleted.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// Errors from search history operations.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("History storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

/// Result type for search history operations.
pub type HistoryResult<T> = Result<T, HistoryError>;

/// One recorded weather search.
///
/// `id` is a storage detail and is not serialized to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRecord {
    #[serde(skip_serializing)]
    pub id: i64,
    pub city_name: String,
    pub timestamp: DateTime<Utc>,
}

/// Per-city search count for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityCount {
    pub city_name: String,
    pub count: u64,
}

/// SQLite-based search history store.
pub struct SearchHistoryStore {
    conn: Connection,
}

impl SearchHistoryStore {
    /// Open (or create) the history database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> HistoryResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory history store (for testing).
    pub fn in_memory() -> HistoryResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> HistoryResult<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS search_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                city_name TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_search_history_timestamp
                ON search_history(timestamp DESC);
            "#,
        )?;
        Ok(())
    }

    /// Append one record for `city` stamped with the current time.
    pub fn record_search(&self, city: &str) -> HistoryResult<SearchRecord> {
        self.record_search_at(city, Utc::now())
    }

    /// Append one record for `city` with an explicit timestamp.
    ///
    /// Exists so tests and backfills can place records on specific days:
    /// the serving path always stamps with the current time.
    pub fn record_search_at(
        &self,
        city: &str,
        timestamp: DateTime<Utc>,
    ) -> HistoryResult<SearchRecord> {
        // Microsecond precision, trailing Z: uniform text sorts chronologically.
        let stamp = timestamp.to_rfc3339_opts(SecondsFormat::Micros, true);
        self.conn.execute(
            "INSERT INTO search_history (city_name, timestamp) VALUES (?1, ?2)",
            params![city, stamp],
        )?;
        let id = self.conn.last_insert_rowid();

        let stored = DateTime::parse_from_rfc3339(&stamp)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(timestamp);

        Ok(SearchRecord {
            id,
            city_name: city.to_string(),
            timestamp: stored,
        })
    }

    /// All records, most recent first.
    pub fn list_all(&self) -> HistoryResult<Vec<SearchRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, city_name, timestamp
             FROM search_history
             ORDER BY timestamp DESC, id DESC",
        )?;

        let rows = stmt.query_map([], Self::row_to_record)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Number of records whose timestamp falls on `date` (UTC).
    pub fn count_on(&self, date: NaiveDate) -> HistoryResult<u64> {
        let day = date.format("%Y-%m-%d").to_string();
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM search_history WHERE substr(timestamp, 1, 10) = ?1",
            params![day],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Per-city counts for `date`, most searched first, at most `limit` entries.
    ///
    /// Ties are broken by city name ascending so the ranking is deterministic.
    pub fn top_cities_on(&self, date: NaiveDate, limit: u32) -> HistoryResult<Vec<CityCount>> {
        let day = date.format("%Y-%m-%d").to_string();
        let mut stmt = self.conn.prepare(
            "SELECT city_name, COUNT(*) AS searches
             FROM search_history
             WHERE substr(timestamp, 1, 10) = ?1
             GROUP BY city_name
             ORDER BY searches DESC, city_name ASC
             LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![day, limit], |row| {
            Ok(CityCount {
                city_name: row.get(0)?,
                count: row.get::<_, i64>(1)? as u64,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<SearchRecord> {
        let id: i64 = row.get(0)?;
        let city_name: String = row.get(1)?;
        let timestamp_str: String = row.get(2)?;

        let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(SearchRecord {
            id,
            city_name,
            timestamp,
        })
    }
}
