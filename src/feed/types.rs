use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One normalized hourly price from the feed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub start_date: DateTime<Utc>,
    pub value: f64,
    pub unit: String,
}

impl PricePoint {
    pub fn new(start_date: DateTime<Utc>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            start_date,
            value,
            unit: unit.into(),
        }
    }
}

/// Response envelope as sent by the feed
#[derive(Debug, Deserialize)]
pub(crate) struct FeedResponse {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub series: Vec<FeedSeriesEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FeedSeriesEntry {
    /// Compact local form, e.g. `2024-02-25T13:00`
    pub start_date: String,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub unit: String,
}
