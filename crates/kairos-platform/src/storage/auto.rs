//! Pick the persistent storage backend when the browser allows it.

use std::rc::Rc;
use kairos_core::ports::StoragePort;
use super::{IndexedDbStorage, MemoryStorage};

/// IndexedDB when it opens, memory otherwise. Never fails: a kiosk without
/// persistence still runs, it only forgets catalog edits on reload.
pub async fn auto_detect_storage() -> Rc<dyn StoragePort> {
    match IndexedDbStorage::open().await {
        Ok(idb) => {
            log::info!("Storage backend: IndexedDB");
            Rc::new(idb)
        }
        Err(e) => {
            log::warn!("IndexedDB unavailable ({}), falling back to memory", e);
            Rc::new(MemoryStorage::new())
        }
    }
}
