//! Structured logging and tracing for spotsync
//!
//! Console and daily-rotated file output built on `tracing-subscriber`, plus
//! a small component-scoped logger used by the sync jobs.

mod level;
mod state;
mod structured;

pub use level::{level_rank, min_level, parse_log_level};
pub use structured::{LogContext, StructuredLogger, get_logger};

use crate::config::LoggingConfig;
use crate::error::{Result, SpotSyncError};
use state::{INIT_ERROR, INIT_ONCE, LOG_GUARD};
use std::path::Path;
use tracing::{Level, info};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::Layered;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

type FilteredRegistry = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

/// Initialize logging system based on configuration
///
/// Only the first call configures anything; later calls report the outcome
/// of that first attempt.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    INIT_ONCE.call_once(|| {
        if let Err(e) = configure(config) {
            let _ = INIT_ERROR.set(e.to_string());
        }
    });

    match INIT_ERROR.get() {
        Some(err) => Err(SpotSyncError::config(err.clone())),
        None => Ok(()),
    }
}

fn configure(config: &LoggingConfig) -> Result<()> {
    let base_level = parse_log_level(&config.level)?;
    let override_or_base = |raw: &Option<String>| {
        raw.as_deref()
            .and_then(|s| parse_log_level(s).ok())
            .unwrap_or(base_level)
    };
    let console_level = override_or_base(&config.console_level);
    let file_level = override_or_base(&config.file_level);

    let filter = build_env_filter(min_level(console_level, file_level));
    let console = || fmt_layer(std::io::stdout, config.json_format, true, console_level);

    if should_use_console_only() {
        install(filter, vec![console()])?;
        info!(
            "Logging initialized - console_level: {:?}, console-only",
            console_level
        );
        return Ok(());
    }

    let appender = rolling::Builder::new()
        .rotation(rolling::Rotation::DAILY)
        .filename_prefix("spotsync")
        .filename_suffix("log")
        .max_log_files(config.backup_count.max(1) as usize)
        .build(log_dir(&config.file))
        .map_err(|e| SpotSyncError::io(format!("Failed to create log file appender: {}", e)))?;
    let (writer, guard) = non_blocking(appender);
    let _ = LOG_GUARD.set(guard);

    let mut layers = vec![fmt_layer(writer, config.json_format, false, file_level)];
    if config.console_output {
        layers.push(console());
    }
    install(filter, layers)?;

    info!(
        "Logging initialized - console_level: {:?}, file_level: {:?}, file: {}",
        console_level, file_level, config.file
    );
    Ok(())
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "spotsync={},tokio_cron_scheduler=warn,reqwest=warn",
            level
        )
        .into()
    })
}

fn should_use_console_only() -> bool {
    cfg!(test) || std::env::var_os("SPOTSYNC_DISABLE_FILE_LOG").is_some()
}

/// Directory for the rolling files: the parent of a file path, or the path itself
fn log_dir(file: &str) -> &Path {
    let p = Path::new(file);
    match p.parent() {
        Some(parent) if p.extension().is_some() => parent,
        _ => p,
    }
}

fn fmt_layer<W>(writer: W, json: bool, ansi: bool, level: Level) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let base = fmt::layer()
        .with_writer(writer)
        .with_target(false)
        .with_thread_ids(false)
        .with_ansi(ansi)
        .with_file(false);
    let level = LevelFilter::from_level(level);
    if json {
        base.json().with_filter(level).boxed()
    } else {
        base.with_filter(level).boxed()
    }
}

fn install(filter: EnvFilter, layers: Vec<BoxedLayer>) -> Result<()> {
    tracing_subscriber::registry()
        .with(filter)
        .with(layers)
        .try_init()
        .map_err(|e| SpotSyncError::config(format!("Logging already initialized: {}", e)))
}
