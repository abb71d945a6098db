//! Clone-able async handle over the search history store.
//!
//! The store itself is synchronous rusqlite; this wrapper serializes access
//! behind a mutex and runs queries on the blocking thread pool so request
//! handlers and the statistics job can share one connection.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;

use crate::history::{CityCount, SearchHistoryStore, SearchRecord};

/// Async handle to the search history store.
#[derive(Clone)]
pub struct HistoryClient {
    store: Arc<Mutex<SearchHistoryStore>>,
}

impl HistoryClient {
    /// Wrap a store in a shared async handle.
    pub fn new(store: SearchHistoryStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Append one record for `city` stamped with the current time.
    pub async fn record_search(&self, city: &str) -> Result<SearchRecord> {
        let store = self.store.clone();
        let city = city.to_string();
        tokio::task::spawn_blocking(move || {
            store
                .lock()
                .record_search(&city)
                .map_err(anyhow::Error::from)
        })
        .await?
    }

    /// Append one record for `city` with an explicit timestamp.
    pub async fn record_search_at(
        &self,
        city: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<SearchRecord> {
        let store = self.store.clone();
        let city = city.to_string();
        tokio::task::spawn_blocking(move || {
            store
                .lock()
                .record_search_at(&city, timestamp)
                .map_err(anyhow::Error::from)
        })
        .await?
    }

    /// All records, most recent first.
    pub async fn list_all(&self) -> Result<Vec<SearchRecord>> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.lock().list_all().map_err(anyhow::Error::from))
            .await?
    }

    /// Number of records on `date` (UTC).
    pub async fn count_on(&self, date: NaiveDate) -> Result<u64> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || {
            store.lock().count_on(date).map_err(anyhow::Error::from)
        })
        .await?
    }

    /// Per-city counts for `date`, most searched first.
    pub async fn top_cities_on(&self, date: NaiveDate, limit: u32) -> Result<Vec<CityCount>> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || {
            store
                .lock()
                .top_cities_on(date, limit)
                .map_err(anyhow::Error::from)
        })
        .await?
    }
}
