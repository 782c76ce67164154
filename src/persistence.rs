//! JSON-file price store
//!
//! Keeps all price records in memory and rewrites the whole file after each
//! save (write to a temporary sibling, then rename). A failed write leaves
//! both the file and the in-memory view unchanged.
//!
//! Records are never pruned, so the file grows by one entry per new hour
//! (about 9k records a year). Each save serializes the full set.

use crate::error::{Result, SpotSyncError};
use crate::logging::{StructuredLogger, get_logger};
use crate::store::{PriceStore, StoredPriceRecord};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// On-disk layout
#[derive(Debug, Default, Deserialize)]
struct StoreFile {
    #[serde(default)]
    records: Vec<StoredPriceRecord>,
}

/// Borrowed view of [`StoreFile`] for writing
#[derive(Serialize)]
struct StoreFileRef<'a> {
    records: &'a [StoredPriceRecord],
}

/// Price store backed by a JSON file (or by nothing, see [`FilePriceStore::in_memory`])
pub struct FilePriceStore {
    path: Option<PathBuf>,
    records: RwLock<Vec<StoredPriceRecord>>,
    logger: StructuredLogger,
}

impl FilePriceStore {
    /// Open the store at `path`, loading existing records if the file exists
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let logger = get_logger("store");

        let records = if tokio::fs::try_exists(&path).await? {
            let contents = tokio::fs::read_to_string(&path).await?;
            let file: StoreFile = serde_json::from_str(&contents)?;
            logger
                .with_field("records", file.records.len())
                .info("Loaded price store from disk");
            file.records
        } else {
            logger
                .with_field("path", path.display())
                .info("No price store file found, starting empty");
            Vec::new()
        };

        Ok(Self {
            path: Some(path),
            records: RwLock::new(records),
            logger,
        })
    }

    /// Store that never touches disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            records: RwLock::new(Vec::new()),
            logger: get_logger("store"),
        }
    }

    /// Snapshot of all records in insertion order
    pub async fn records(&self) -> Vec<StoredPriceRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    async fn persist(&self, records: &[StoredPriceRecord]) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let contents = serde_json::to_string_pretty(&StoreFileRef { records })?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, contents).await?;
        tokio::fs::rename(&tmp, path).await?;
        self.logger.trace("Saved price store to disk");
        Ok(())
    }
}

#[async_trait::async_trait]
impl PriceStore for FilePriceStore {
    async fn find_by_date(&self, key: &str) -> Result<Option<StoredPriceRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.date == key).cloned())
    }

    async fn save(&self, record: &mut StoredPriceRecord) -> Result<()> {
        if record.date.is_empty() {
            return Err(SpotSyncError::store("record date cannot be empty"));
        }

        let mut records = self.records.write().await;
        let mut saved = record.clone();
        if saved.is_new() {
            saved.id = uuid::Uuid::new_v4().to_string();
        }
        let id = saved.id.clone();

        // apply in place, keeping what is needed to undo it
        let replaced = match records.iter().position(|r| r.id == saved.id) {
            Some(index) => Some((index, std::mem::replace(&mut records[index], saved))),
            None => {
                records.push(saved);
                None
            }
        };

        if let Err(e) = self.persist(&records).await {
            match replaced {
                Some((index, previous)) => records[index] = previous,
                None => {
                    records.pop();
                }
            }
            return Err(SpotSyncError::store(format!(
                "failed to write price store: {}",
                e
            )));
        }

        record.id = id;
        Ok(())
    }
}
