//! Consultation history persisted through `StoragePort`.
//!
//! Records are keyed by their backend id, so loading a newer export over an
//! older one updates the overlapping consultations instead of repeating them.

use std::rc::Rc;
use async_trait::async_trait;
use kairos_core::ports::{ConsultationLogPort, StoragePort};
use kairos_types::{Result, history::ConsultationRecord};

const CONSULTATION_PREFIX: &str = "consulta:";

fn key(id: u64) -> String {
    format!("{}{:012}", CONSULTATION_PREFIX, id)
}

pub struct StorageConsultationLog {
    storage: Rc<dyn StoragePort>,
}

impl StorageConsultationLog {
    pub fn new(storage: Rc<dyn StoragePort>) -> Self {
        Self { storage }
    }

    /// Upsert every record of a JSON array export. Returns how many were
    /// written; nothing is written when the export does not parse.
    pub async fn import_json(&self, json: &str) -> Result<usize> {
        let records: Vec<ConsultationRecord> = serde_json::from_str(json)?;
        for record in &records {
            self.storage.set(&key(record.id), &serde_json::to_vec(record)?).await?;
        }
        log::info!("Imported {} consultations", records.len());
        Ok(records.len())
    }

    pub async fn clear(&self) -> Result<()> {
        for key in self.storage.list_keys(CONSULTATION_PREFIX).await? {
            self.storage.delete(&key).await?;
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl ConsultationLogPort for StorageConsultationLog {
    async fn consultations(&self) -> Result<Vec<ConsultationRecord>> {
        let keys = self.storage.list_keys(CONSULTATION_PREFIX).await?;
        let mut records = Vec::with_capacity(keys.len());
        for key in &keys {
            if let Some(bytes) = self.storage.get(key).await? {
                match serde_json::from_slice(&bytes) {
                    Ok(record) => records.push(record),
                    Err(e) => log::warn!("Skipping unreadable consultation {}: {}", key, e),
                }
            }
        }
        Ok(records)
    }

    async fn consultation(&self, id: u64) -> Result<Option<ConsultationRecord>> {
        match self.storage.get(&key(id)).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}
