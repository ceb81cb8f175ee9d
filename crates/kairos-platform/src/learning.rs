//! Learning export (patterns, training runs, knowledge cache) kept as one
//! document. Each load replaces the previous snapshot.

use std::rc::Rc;
use async_trait::async_trait;
use kairos_core::ports::{LearningPort, StoragePort};
use kairos_types::{Result, learning::LearningExport};

const LEARNING_KEY: &str = "learning:export";

pub struct StorageLearning {
    storage: Rc<dyn StoragePort>,
}

impl StorageLearning {
    pub fn new(storage: Rc<dyn StoragePort>) -> Self {
        Self { storage }
    }

    /// Store a JSON export. Returns the number of patterns it holds.
    pub async fn import_json(&self, json: &str) -> Result<usize> {
        let export: LearningExport = serde_json::from_str(json)?;
        self.storage.set(LEARNING_KEY, &serde_json::to_vec(&export)?).await?;
        log::info!(
            "Learning export loaded: {} patterns, {} trainings, {} cached answers",
            export.patrones.len(),
            export.entrenamientos.len(),
            export.conocimientos.len()
        );
        Ok(export.patrones.len())
    }

    pub async fn clear(&self) -> Result<()> {
        self.storage.delete(LEARNING_KEY).await
    }
}

#[async_trait(?Send)]
impl LearningPort for StorageLearning {
    async fn learning(&self) -> Result<LearningExport> {
        match self.storage.get(LEARNING_KEY).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(LearningExport::default()),
        }
    }
}
