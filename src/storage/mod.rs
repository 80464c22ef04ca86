//! Activity record storage
//!
//! The persistence collaborator's seam: the engine only needs ordered
//! retrieval and upsert-by-(user, date). `MemoryActivityStore` backs dev
//! mode and tests; a database-backed implementation lives behind the same
//! trait.

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use std::collections::BTreeMap;

use crate::emissions::ActivityRecord;

/// Ordered retrieval and upsert of per-user daily activity records
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Insert or overwrite the record for (user, record.date)
    ///
    /// Returns true when an existing record for that day was replaced.
    async fn upsert(&self, user_id: &str, record: ActivityRecord) -> bool;

    /// Records for a user, most recent date first, at most `limit`
    async fn recent(&self, user_id: &str, limit: usize) -> Vec<ActivityRecord>;

    /// All records for a user, most recent date first
    async fn all(&self, user_id: &str) -> Vec<ActivityRecord>;

    /// Delete the record for (user, date); true when one existed
    async fn delete(&self, user_id: &str, date: NaiveDate) -> bool;
}

/// In-memory store keyed by user, with records ordered by date
pub struct MemoryActivityStore {
    records: DashMap<String, BTreeMap<NaiveDate, ActivityRecord>>,
}

impl MemoryActivityStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }
}

impl Default for MemoryActivityStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActivityStore for MemoryActivityStore {
    async fn upsert(&self, user_id: &str, record: ActivityRecord) -> bool {
        let mut days = self.records.entry(user_id.to_string()).or_default();
        days.insert(record.date, record).is_some()
    }

    async fn recent(&self, user_id: &str, limit: usize) -> Vec<ActivityRecord> {
        match self.records.get(user_id) {
            Some(days) => days.values().rev().take(limit).cloned().collect(),
            None => Vec::new(),
        }
    }

    async fn all(&self, user_id: &str) -> Vec<ActivityRecord> {
        match self.records.get(user_id) {
            Some(days) => days.values().rev().cloned().collect(),
            None => Vec::new(),
        }
    }

    async fn delete(&self, user_id: &str, date: NaiveDate) -> bool {
        match self.records.get_mut(user_id) {
            Some(mut days) => days.remove(&date).is_some(),
            None => false,
        }
    }
}
