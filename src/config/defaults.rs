use super::*;

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://web.fortum.fi/api/v2".to_string(),
            price_list_key: "1047".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "/data/spotsync/electricity_prices.json".to_string(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            // minute 0 of every 4th hour
            price_sync_cron: "0 0 */4 * * *".to_string(),
            // minute 1 of every hour
            display_cron: "0 1 * * * *".to_string(),
            run_on_startup: true,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            brightness: 0x08,
            // panel dark from 03:00 to 08:59 local time
            quiet_from_hour: 3,
            quiet_until_hour: 8,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            console_level: None,
            file_level: None,
            file: "/tmp/spotsync.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            store: StoreConfig::default(),
            schedule: ScheduleConfig::default(),
            display: DisplayConfig::default(),
            logging: LoggingConfig::default(),
            timezone: "Europe/Helsinki".to_string(),
        }
    }
}
