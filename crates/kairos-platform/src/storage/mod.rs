pub mod memory;
pub mod indexeddb;
pub mod auto;

pub use memory::MemoryStorage;
pub use indexeddb::IndexedDbStorage;
pub use auto::auto_detect_storage;

use kairos_core::ports::StoragePort;
use kairos_types::{KioskError, Result};

/// Hand out the next value of a counter persisted under `key`, starting at 1.
pub async fn next_sequence(storage: &dyn StoragePort, key: &str) -> Result<u64> {
    let current = match storage.get(key).await? {
        Some(bytes) => String::from_utf8_lossy(&bytes)
            .trim()
            .parse::<u64>()
            .map_err(|e| KioskError::Storage(format!("corrupt counter '{}': {}", key, e)))?,
        None => 0,
    };
    let next = current + 1;
    storage.set(key, next.to_string().as_bytes()).await?;
    Ok(next)
}
