//! Cron-driven job registration
//!
//! Thin wrapper over `tokio-cron-scheduler` that names each job, logs its
//! triggers, and maps scheduler failures into [`SpotSyncError`].

use crate::display::DisplayUpdater;
use crate::error::{Result, SpotSyncError};
use crate::logging::{StructuredLogger, get_logger};
use crate::reconciler::PriceReconciler;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use uuid::Uuid;

/// Job name of the price synchronization
pub const PRICE_SYNC_JOB: &str = "electricityPriceUpdater";
/// Job name of the display refresh
pub const DISPLAY_JOB: &str = "displayUpdater";

/// Named periodic jobs on a cron scheduler
pub struct SyncScheduler {
    inner: JobScheduler,
    jobs: Vec<(String, Uuid)>,
    logger: StructuredLogger,
}

impl SyncScheduler {
    pub async fn new() -> Result<Self> {
        let inner = JobScheduler::new()
            .await
            .map_err(|e| SpotSyncError::scheduler(format!("failed to create scheduler: {:?}", e)))?;
        Ok(Self {
            inner,
            jobs: Vec::new(),
            logger: get_logger("scheduler"),
        })
    }

    /// Register `task` under `name` on a six-field cron expression
    pub async fn register<F, Fut>(&mut self, name: &str, cron: &str, task: F) -> Result<Uuid>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task = Arc::new(task);
        let job_logger = self.logger.with_field("job", name);
        let job = Job::new_async(cron, move |_id, _scheduler| {
            let task = task.clone();
            let logger = job_logger.clone();
            Box::pin(async move {
                logger.debug("Job triggered");
                (*task)().await;
            })
        })
        .map_err(|e| {
            SpotSyncError::config(format!(
                "invalid cron expression {:?} for job {}: {:?}",
                cron, name, e
            ))
        })?;

        let id = self
            .inner
            .add(job)
            .await
            .map_err(|e| SpotSyncError::scheduler(format!("failed to add job {}: {:?}", name, e)))?;
        self.jobs.push((name.to_string(), id));
        self.logger
            .with_field("job", name)
            .with_field("cron", cron)
            .info("Registered periodic job");
        Ok(id)
    }

    /// Register the price synchronization job
    pub async fn register_price_sync(
        &mut self,
        cron: &str,
        reconciler: Arc<PriceReconciler>,
    ) -> Result<Uuid> {
        self.register(PRICE_SYNC_JOB, cron, move || {
            let reconciler = reconciler.clone();
            async move {
                reconciler.run().await;
            }
        })
        .await
    }

    /// Register the display refresh job; failures are logged and swallowed
    pub async fn register_display(
        &mut self,
        cron: &str,
        updater: Arc<Mutex<DisplayUpdater>>,
    ) -> Result<Uuid> {
        let logger = self.logger.with_field("job", DISPLAY_JOB);
        self.register(DISPLAY_JOB, cron, move || {
            let updater = updater.clone();
            let logger = logger.clone();
            async move {
                if let Err(e) = updater.lock().await.refresh().await {
                    logger
                        .with_field("error", &e)
                        .warn("Failed to update display");
                }
            }
        })
        .await
    }

    /// Names of the registered jobs in registration order
    pub fn job_names(&self) -> Vec<&str> {
        self.jobs.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub async fn start(&self) -> Result<()> {
        self.inner
            .start()
            .await
            .map_err(|e| SpotSyncError::scheduler(format!("failed to start scheduler: {:?}", e)))?;
        self.logger
            .with_field("jobs", self.jobs.len())
            .info("Scheduler started");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.inner
            .shutdown()
            .await
            .map_err(|e| SpotSyncError::scheduler(format!("failed to stop scheduler: {:?}", e)))?;
        self.logger.info("Scheduler stopped");
        Ok(())
    }
}
