//! # spotsync - spot electricity price synchronizer
//!
//! Pulls hourly spot electricity prices from the Fortum pricing feed and
//! reconciles them into a local price store on a cron cadence, and keeps a
//! small two-line status display up to date.
//!
//! ## Architecture
//!
//! - `time_window`: fetch window and the feed/store date formats
//! - `feed`: HTTP client and decoder for the spot price feed
//! - `store`: price record store interface
//! - `persistence`: JSON-file implementation of the store
//! - `reconciler`: one synchronization run (lookup, compare, upsert)
//! - `scheduler`: cron registration of the periodic jobs
//! - `display`: current/next hour price display
//! - `clock`: injected time source
//! - `config`: YAML configuration and validation
//! - `logging`: structured logging and tracing
//! - `error`: error taxonomy

pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod feed;
pub mod logging;
pub mod persistence;
pub mod reconciler;
pub mod scheduler;
pub mod store;
pub mod time_window;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, SpotSyncError};
pub use reconciler::{PriceReconciler, RunOutcome, RunReport};
