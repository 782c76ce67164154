use spotsync::config::LoggingConfig;
use spotsync::logging::{
    LogContext, StructuredLogger, get_logger, init_logging, level_rank, min_level,
    parse_log_level,
};
use tracing::Level;

#[test]
fn levels_accept_common_spellings() {
    assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
    assert_eq!(parse_log_level("WARNING").unwrap(), Level::WARN);
    assert_eq!(parse_log_level("Error").unwrap(), Level::ERROR);
    assert!(parse_log_level("verbose").is_err());
}

#[test]
fn rank_orders_by_verbosity() {
    assert!(level_rank(Level::TRACE) < level_rank(Level::DEBUG));
    assert!(level_rank(Level::WARN) < level_rank(Level::ERROR));
    assert_eq!(min_level(Level::ERROR, Level::INFO), Level::INFO);
}

#[test]
fn init_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = LoggingConfig {
        level: "DEBUG".to_string(),
        file: dir.path().join("spotsync.log").to_string_lossy().to_string(),
        console_output: false,
        ..LoggingConfig::default()
    };
    assert!(init_logging(&cfg).is_ok());
    assert!(init_logging(&cfg).is_ok());
}

#[test]
fn logger_keeps_component() {
    let logger = get_logger("feed").with_field("from", "2024-02-25T00:00:00");
    assert_eq!(logger.component(), "feed");
    logger.debug("Requesting spot prices");

    let ctx = LogContext::new("store").with_field("records", "3".to_string());
    let logger = StructuredLogger::new(ctx);
    assert_eq!(logger.component(), "store");
    logger.info("Loaded price store from disk");
}
