//! AI usage log persisted through `StoragePort`.
//!
//! The diagnostic backend owns the log; the admin loads its JSON export
//! here so the dashboard can aggregate it offline.

use std::rc::Rc;
use async_trait::async_trait;
use kairos_core::ports::{StoragePort, UsageLogPort};
use kairos_types::{Result, usage::UsageLogEntry};

use crate::storage::next_sequence;

const USAGE_PREFIX: &str = "usage:";
const NEXT_SEQ_KEY: &str = "usage_log:next_seq";

pub struct StorageUsageLog {
    storage: Rc<dyn StoragePort>,
}

impl StorageUsageLog {
    pub fn new(storage: Rc<dyn StoragePort>) -> Self {
        Self { storage }
    }

    pub async fn append(&self, entry: &UsageLogEntry) -> Result<()> {
        let seq = next_sequence(self.storage.as_ref(), NEXT_SEQ_KEY).await?;
        let key = format!("{}{:012}", USAGE_PREFIX, seq);
        self.storage.set(&key, &serde_json::to_vec(entry)?).await
    }

    /// Replace the stored log with a JSON array export. The export is parsed
    /// before anything is deleted, so a malformed paste keeps the old log.
    /// Returns how many entries were stored.
    pub async fn import_json(&self, json: &str) -> Result<usize> {
        let entries: Vec<UsageLogEntry> = serde_json::from_str(json)?;
        self.clear().await?;
        for entry in &entries {
            self.append(entry).await?;
        }
        log::info!("Imported {} usage log entries", entries.len());
        Ok(entries.len())
    }

    pub async fn clear(&self) -> Result<()> {
        for key in self.storage.list_keys(USAGE_PREFIX).await? {
            self.storage.delete(&key).await?;
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl UsageLogPort for StorageUsageLog {
    async fn entries(&self) -> Result<Vec<UsageLogEntry>> {
        let keys = self.storage.list_keys(USAGE_PREFIX).await?;
        let mut entries = Vec::with_capacity(keys.len());
        for key in &keys {
            if let Some(bytes) = self.storage.get(key).await? {
                match serde_json::from_slice(&bytes) {
                    Ok(entry) => entries.push(entry),
                    Err(e) => log::warn!("Skipping unreadable usage entry {}: {}", key, e),
                }
            }
        }
        Ok(entries)
    }
}
