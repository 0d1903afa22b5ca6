//! Recent lookups and the side-by-side compare list.
//!
//! Both lists persist through a [`CacheStore`] and load best-effort: a
//! missing or undecodable entry yields an empty list.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fipe_data::PriceResult;

use crate::cache::{read_cache, write_cache, CacheStore};

/// Storage key of the recent-history list.
pub const HISTORY_KEY: &str = "fipe_history";

/// Storage key of the compare list.
pub const COMPARE_KEY: &str = "compare_list";

pub const MAX_HISTORY: usize = 10;
pub const MAX_COMPARE: usize = 3;

/// A priced vehicle as remembered by the lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub brand: String,
    pub model: String,
    /// Year code the price was fetched for, e.g. `2023-1`.
    pub year: String,
    pub value: String,
    pub fipe_code: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn from_result(result: &PriceResult, year: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            brand: result.brand_name.clone(),
            model: result.model_name.clone(),
            year: year.to_string(),
            value: result.price.clone(),
            fipe_code: result.fipe_code.clone(),
            timestamp,
        }
    }

    fn same_vehicle(&self, other: &HistoryEntry) -> bool {
        self.fipe_code == other.fipe_code && self.year == other.year
    }
}

/// Most-recent-first list of priced vehicles.
pub struct RecentHistory {
    store: Arc<dyn CacheStore>,
    entries: Vec<HistoryEntry>,
}

impl RecentHistory {
    pub fn load(store: Arc<dyn CacheStore>) -> Self {
        let mut entries: Vec<HistoryEntry> = read_cache(store.as_ref(), HISTORY_KEY).unwrap_or_default();
        entries.truncate(MAX_HISTORY);
        Self { store, entries }
    }

    /// Puts `entry` first, replacing an earlier lookup of the same vehicle.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.retain(|e| !e.same_vehicle(&entry));
        self.entries.insert(0, entry);
        self.entries.truncate(MAX_HISTORY);
        self.persist();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    fn persist(&self) {
        write_cache(self.store.as_ref(), HISTORY_KEY, &self.entries);
    }
}

/// Why an entry was not added to the compare list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareRejection {
    Full,
    Duplicate,
}

/// Up to three vehicles kept for comparison, in insertion order.
pub struct CompareList {
    store: Arc<dyn CacheStore>,
    entries: Vec<HistoryEntry>,
}

impl CompareList {
    pub fn load(store: Arc<dyn CacheStore>) -> Self {
        let mut entries: Vec<HistoryEntry> = read_cache(store.as_ref(), COMPARE_KEY).unwrap_or_default();
        entries.truncate(MAX_COMPARE);
        Self { store, entries }
    }

    pub fn add(&mut self, entry: HistoryEntry) -> Result<(), CompareRejection> {
        if self.entries.iter().any(|e| e.same_vehicle(&entry)) {
            return Err(CompareRejection::Duplicate);
        }
        if self.entries.len() >= MAX_COMPARE {
            return Err(CompareRejection::Full);
        }
        self.entries.push(entry);
        self.persist();
        Ok(())
    }

    /// Removes the entry at `index`, if any.
    pub fn remove(&mut self, index: usize) -> Option<HistoryEntry> {
        if index >= self.entries.len() {
            return None;
        }
        let removed = self.entries.remove(index);
        self.persist();
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    fn persist(&self) {
        write_cache(self.store.as_ref(), COMPARE_KEY, &self.entries);
    }
}
