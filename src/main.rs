use anyhow::{Context, Result};
use spotsync::clock::SystemClock;
use spotsync::display::{DisplayUpdater, LogDisplay};
use spotsync::feed::FeedClient;
use spotsync::persistence::FilePriceStore;
use spotsync::scheduler::SyncScheduler;
use spotsync::{Config, PriceReconciler};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    spotsync::logging::init_logging(&config.logging).context("failed to initialize logging")?;
    config.validate().context("invalid configuration")?;

    info!("spotsync {} starting up", env!("APP_VERSION"));

    let clock = Arc::new(SystemClock);
    let store = Arc::new(
        FilePriceStore::open(&config.store.path)
            .await
            .with_context(|| format!("failed to open price store {}", config.store.path))?,
    );
    let feed = Arc::new(FeedClient::new(&config.feed).context("failed to build feed client")?);
    let reconciler = Arc::new(PriceReconciler::new(feed, store.clone(), clock.clone()));

    let mut scheduler = SyncScheduler::new().await?;

    if config.schedule.run_on_startup {
        reconciler.run().await;
    }
    scheduler
        .register_price_sync(&config.schedule.price_sync_cron, reconciler)
        .await?;

    if config.display.enabled {
        let updater = DisplayUpdater::new(
            Box::new(LogDisplay::new()),
            store,
            clock,
            config.tz()?,
            config.display.brightness,
        )
        .with_quiet_hours(
            config.display.quiet_from_hour,
            config.display.quiet_until_hour,
        );
        let updater = Arc::new(Mutex::new(updater));
        if let Err(e) = updater.lock().await.refresh().await {
            error!("Initial display update failed: {}", e);
        }
        scheduler
            .register_display(&config.schedule.display_cron, updater)
            .await?;
    }

    scheduler.start().await?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("Shutdown requested");
    scheduler.shutdown().await?;
    info!("spotsync shutdown complete");
    Ok(())
}
