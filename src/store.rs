//! Price record store interface
//!
//! The reconciler talks to its store only through [`PriceStore`]: a lookup by
//! canonical date key and an upsert by record id. Uniqueness of dates is the
//! caller's job (find-before-create); the store does not enforce it.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Persisted hourly price, keyed conceptually by `date`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredPriceRecord {
    /// Store-assigned identity; empty until the first successful save
    #[serde(default)]
    pub id: String,
    /// Canonical key, see [`crate::time_window::store_key`]
    pub date: String,
    pub value: f64,
    pub unit: String,
}

impl StoredPriceRecord {
    /// Unsaved record with no identity yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the record has never been saved
    pub fn is_new(&self) -> bool {
        self.id.is_empty()
    }
}

/// Record store used by the price sync and the display
#[async_trait::async_trait]
pub trait PriceStore: Send + Sync {
    /// First record whose `date` equals `key`, if any
    async fn find_by_date(&self, key: &str) -> Result<Option<StoredPriceRecord>>;

    /// Insert or update by id; assigns a fresh id to new records
    async fn save(&self, record: &mut StoredPriceRecord) -> Result<()>;
}
