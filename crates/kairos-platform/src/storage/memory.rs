//! In-memory storage backend.
//!
//! Used when IndexedDB is unavailable (private browsing, tests). Contents
//! are lost on reload. Keys are kept ordered so listings are stable.

use std::cell::RefCell;
use std::collections::BTreeMap;
use async_trait::async_trait;
use kairos_core::ports::StoragePort;
use kairos_types::Result;

pub struct MemoryStorage {
    data: RefCell<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            data: RefCell::new(BTreeMap::new()),
        }
    }
}

#[async_trait(?Send)]
impl StoragePort for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.data.borrow().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.data
            .borrow_mut()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.data.borrow_mut().remove(key);
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        let data = self.data.borrow();
        let keys = data
            .range(prefix.to_string()..)
            .map(|(k, _)| k)
            .take_while(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        Ok(keys)
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}
