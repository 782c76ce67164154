//! Configuration management for spotsync
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files.

use crate::error::{Result, SpotSyncError};
use serde::{Deserialize, Serialize};
use std::path::Path;

mod defaults;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upstream price feed connection
    pub feed: FeedConfig,

    /// Price store location
    pub store: StoreConfig,

    /// Cron cadences for the periodic jobs
    pub schedule: ScheduleConfig,

    /// Status display configuration
    pub display: DisplayConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Timezone used for human-facing hour labels
    pub timezone: String,
}

/// Spot price feed parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Base URL of the pricing API (without the endpoint path)
    pub base_url: String,

    /// Price list identifier sent as `priceListKey`
    pub price_list_key: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Price store parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the JSON file holding the price records
    pub path: String,
}

/// Job cadences, six-field cron expressions (seconds first)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Price synchronization cadence
    pub price_sync_cron: String,

    /// Display refresh cadence
    pub display_cron: String,

    /// Run the price sync once before the scheduler starts
    pub run_on_startup: bool,
}

/// Status display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Whether the display job is registered
    pub enabled: bool,

    /// Backlight brightness used for the price colour
    pub brightness: u8,

    /// First local hour of the quiet period (panel off)
    pub quiet_from_hour: u32,

    /// Last local hour of the quiet period, inclusive
    pub quiet_until_hour: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Optional override for console output level
    pub console_level: Option<String>,

    /// Optional override for file output level
    pub file_level: Option<String>,

    /// Path to log file (its directory receives the rolling files)
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    pub fn load() -> Result<Self> {
        let default_paths = [
            "spotsync.yaml",
            "/data/spotsync.yaml",
            "/etc/spotsync/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        Ok(Config::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parsed display timezone
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|e| SpotSyncError::validation("timezone".to_string(), e.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.feed.base_url.trim().is_empty() {
            return Err(SpotSyncError::validation(
                "feed.base_url",
                "Base URL cannot be empty",
            ));
        }

        if !self.feed.base_url.starts_with("http://") && !self.feed.base_url.starts_with("https://")
        {
            return Err(SpotSyncError::validation(
                "feed.base_url",
                "Base URL must use http or https",
            ));
        }

        if self.feed.price_list_key.trim().is_empty() {
            return Err(SpotSyncError::validation(
                "feed.price_list_key",
                "Price list key cannot be empty",
            ));
        }

        if self.feed.timeout_secs == 0 {
            return Err(SpotSyncError::validation(
                "feed.timeout_secs",
                "Must be greater than 0",
            ));
        }

        if self.store.path.trim().is_empty() {
            return Err(SpotSyncError::validation(
                "store.path",
                "Store path cannot be empty",
            ));
        }

        if self.schedule.price_sync_cron.trim().is_empty() {
            return Err(SpotSyncError::validation(
                "schedule.price_sync_cron",
                "Cron expression cannot be empty",
            ));
        }

        if self.display.enabled && self.schedule.display_cron.trim().is_empty() {
            return Err(SpotSyncError::validation(
                "schedule.display_cron",
                "Cron expression cannot be empty",
            ));
        }

        if self.display.quiet_from_hour > 23 || self.display.quiet_until_hour > 23 {
            return Err(SpotSyncError::validation(
                "display.quiet_from_hour",
                "Quiet hours must be between 0 and 23",
            ));
        }

        crate::logging::parse_log_level(&self.logging.level)?;
        self.tz()?;

        Ok(())
    }
}
