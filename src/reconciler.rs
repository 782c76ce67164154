//! Price synchronization run
//!
//! One run fetches the spot price series for today and tomorrow and merges
//! it into the price store point by point:
//!
//! - a fetch failure aborts the run before any store call;
//! - a lookup or save failure only skips the affected point;
//! - every point is written back, changed or not, so repeated runs converge
//!   on the feed's current view.
//!
//! Value and unit drift on existing records is reported as warning events.

use crate::clock::Clock;
use crate::error::SpotSyncError;
use crate::feed::{PriceFeed, PricePoint};
use crate::logging::{StructuredLogger, get_logger};
use crate::store::{PriceStore, StoredPriceRecord};
use crate::time_window::{FetchWindow, fetch_window, is_hour_aligned, store_key};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Something noteworthy that happened to one price point
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PriceEvent {
    NewPrice {
        date: String,
        value: f64,
        unit: String,
    },
    PriceChanged {
        date: String,
        old_value: f64,
        new_value: f64,
    },
    UnitChanged {
        date: String,
        old_unit: String,
        new_unit: String,
    },
    LookupFailed {
        date: String,
        error: String,
    },
    SaveFailed {
        date: String,
        error: String,
    },
    DataQuality {
        date: String,
        issue: String,
    },
}

/// Why a run stopped before touching the store
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", content = "message", rename_all = "snake_case")]
pub enum AbortReason {
    /// The feed answered with its error flag set
    FeedReported(String),
    /// Transport, timeout or decode failure
    FetchFailed(String),
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Completed,
    Aborted(AbortReason),
    /// Another run held the run guard
    Skipped,
}

/// Result of one synchronization run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub window: FetchWindow,
    pub outcome: RunOutcome,
    pub events: Vec<PriceEvent>,
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
}

impl RunReport {
    fn new(started_at: DateTime<Utc>, window: FetchWindow) -> Self {
        Self {
            started_at,
            window,
            outcome: RunOutcome::Completed,
            events: Vec::new(),
            created: 0,
            updated: 0,
            failed: 0,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.outcome == RunOutcome::Completed
    }

    pub fn price_changes(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, PriceEvent::PriceChanged { .. }))
            .count()
    }

    pub fn unit_changes(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, PriceEvent::UnitChanged { .. }))
            .count()
    }

    pub fn new_prices(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, PriceEvent::NewPrice { .. }))
            .count()
    }
}

/// Merges the spot price feed into the price store
pub struct PriceReconciler {
    feed: Arc<dyn PriceFeed>,
    store: Arc<dyn PriceStore>,
    clock: Arc<dyn Clock>,
    logger: StructuredLogger,
    run_guard: Mutex<()>,
}

impl PriceReconciler {
    pub fn new(
        feed: Arc<dyn PriceFeed>,
        store: Arc<dyn PriceStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            feed,
            store,
            clock,
            logger: get_logger("price_sync"),
            run_guard: Mutex::new(()),
        }
    }

    /// Execute one synchronization run.
    ///
    /// Never fails: every problem ends up as a logged warning, an event in
    /// the report, or an aborted outcome.
    pub async fn run(&self) -> RunReport {
        let started_at = self.clock.now();
        let window = fetch_window(started_at);
        let mut report = RunReport::new(started_at, window);

        let Ok(_guard) = self.run_guard.try_lock() else {
            self.logger.warn("Previous price sync still running, skipping");
            report.outcome = RunOutcome::Skipped;
            return report;
        };

        self.logger.info("Fetching electricity prices");
        let points = match self.feed.fetch(&window).await {
            Ok(points) => points,
            Err(e) => {
                report.outcome = RunOutcome::Aborted(self.log_fetch_failure(&e));
                return report;
            }
        };

        let mut seen = HashSet::with_capacity(points.len());
        for point in &points {
            self.reconcile_point(point, &mut seen, &mut report).await;
        }

        self.logger
            .with_field("points", points.len())
            .with_field("created", report.created)
            .with_field("updated", report.updated)
            .with_field("failed", report.failed)
            .info("Electricity prices synchronized");
        report
    }

    fn log_fetch_failure(&self, err: &SpotSyncError) -> AbortReason {
        let log = self.logger.with_field("error", err);
        match err {
            SpotSyncError::FeedReported { message } => {
                log.warn("Price feed reported an error");
                AbortReason::FeedReported(message.clone())
            }
            _ if err.is_fetch_error() => {
                log.warn("Failed to fetch electricity prices");
                AbortReason::FetchFailed(err.to_string())
            }
            _ => {
                log.error("Unexpected price feed failure");
                AbortReason::FetchFailed(err.to_string())
            }
        }
    }

    async fn reconcile_point(
        &self,
        point: &PricePoint,
        seen: &mut HashSet<String>,
        report: &mut RunReport,
    ) {
        let key = store_key(point.start_date);
        let log = self.logger.with_field("date", &key);

        if !is_hour_aligned(point.start_date) {
            self.flag_data_quality(&log, &key, "start date is not hour-aligned", report);
        }
        if !seen.insert(key.clone()) {
            self.flag_data_quality(&log, &key, "start date repeated within one fetch", report);
        }

        let existing = match self.store.find_by_date(&key).await {
            Ok(existing) => existing,
            Err(e) => {
                log.with_field("error", &e)
                    .warn("Failed to look up electricity price");
                report.events.push(PriceEvent::LookupFailed {
                    date: key,
                    error: e.to_string(),
                });
                report.failed += 1;
                return;
            }
        };

        let created = existing.is_none();
        let mut record = match existing {
            None => {
                log.with_field("value", point.value)
                    .with_field("unit", &point.unit)
                    .warn("New electricity price");
                report.events.push(PriceEvent::NewPrice {
                    date: key.clone(),
                    value: point.value,
                    unit: point.unit.clone(),
                });
                StoredPriceRecord::new()
            }
            Some(record) => {
                self.detect_changes(&log, &key, &record, point, report);
                record
            }
        };

        record.date = key.clone();
        record.value = point.value;
        record.unit = point.unit.clone();

        match self.store.save(&mut record).await {
            Ok(()) if created => report.created += 1,
            Ok(()) => report.updated += 1,
            Err(e) => {
                log.with_field("error", &e)
                    .warn("Failed to save electricity price");
                report.events.push(PriceEvent::SaveFailed {
                    date: key,
                    error: e.to_string(),
                });
                report.failed += 1;
            }
        }
    }

    fn detect_changes(
        &self,
        log: &StructuredLogger,
        key: &str,
        record: &StoredPriceRecord,
        point: &PricePoint,
        report: &mut RunReport,
    ) {
        if record.value != point.value {
            log.with_field("old_value", record.value)
                .with_field("new_value", point.value)
                .warn("Electricity price has changed");
            report.events.push(PriceEvent::PriceChanged {
                date: key.to_string(),
                old_value: record.value,
                new_value: point.value,
            });
        }
        if record.unit != point.unit {
            log.with_field("old_unit", &record.unit)
                .with_field("new_unit", &point.unit)
                .warn("Electricity price unit has changed");
            report.events.push(PriceEvent::UnitChanged {
                date: key.to_string(),
                old_unit: record.unit.clone(),
                new_unit: point.unit.clone(),
            });
        }
    }

    fn flag_data_quality(
        &self,
        log: &StructuredLogger,
        key: &str,
        issue: &str,
        report: &mut RunReport,
    ) {
        log.with_field("issue", issue)
            .warn("Electricity price data quality issue");
        report.events.push(PriceEvent::DataQuality {
            date: key.to_string(),
            issue: issue.to_string(),
        });
    }
}
