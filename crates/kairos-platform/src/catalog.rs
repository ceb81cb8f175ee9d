//! Product catalog persisted through `StoragePort`.
//!
//! Each product is one JSON value:
//!   id 42 → "product:0000000042"
//!
//! Ids come from a persisted counter and are never reused. The unique
//! product code is enforced here on every write.

use std::rc::Rc;
use async_trait::async_trait;
use kairos_core::ports::{CatalogPort, CatalogResult, StoragePort};
use kairos_types::{
    CatalogError,
    product::{Product, ProductDraft},
};

use crate::storage::next_sequence;

const PRODUCT_PREFIX: &str = "product:";
const NEXT_ID_KEY: &str = "catalog:next_id";

pub struct StorageCatalog {
    storage: Rc<dyn StoragePort>,
}

impl StorageCatalog {
    pub fn new(storage: Rc<dyn StoragePort>) -> Self {
        Self { storage }
    }

    fn key_for(id: u64) -> String {
        format!("{}{:010}", PRODUCT_PREFIX, id)
    }

    async fn load(&self, key: &str) -> CatalogResult<Option<Product>> {
        match self.storage.get(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, product: &Product) -> CatalogResult<()> {
        let bytes = serde_json::to_vec(product)?;
        self.storage.set(&Self::key_for(product.id), &bytes).await?;
        Ok(())
    }

    /// Is `code` used by a product other than `except`?
    async fn code_taken(&self, code: &str, except: Option<u64>) -> CatalogResult<bool> {
        Ok(self
            .list()
            .await?
            .iter()
            .any(|p| p.codigo_producto == code && Some(p.id) != except))
    }
}

#[async_trait(?Send)]
impl CatalogPort for StorageCatalog {
    async fn list(&self) -> CatalogResult<Vec<Product>> {
        let keys = self.storage.list_keys(PRODUCT_PREFIX).await?;
        let mut products = Vec::with_capacity(keys.len());
        for key in &keys {
            match self.load(key).await {
                Ok(Some(p)) => products.push(p),
                Ok(None) => {}
                Err(e) => log::warn!("Skipping unreadable catalog entry {}: {}", key, e),
            }
        }
        Ok(products)
    }

    async fn get(&self, id: u64) -> CatalogResult<Option<Product>> {
        self.load(&Self::key_for(id)).await
    }

    async fn find_by_code(&self, code: &str) -> CatalogResult<Option<Product>> {
        Ok(self.list().await?.into_iter().find(|p| p.codigo_producto == code))
    }

    async fn insert(&self, draft: ProductDraft) -> CatalogResult<Product> {
        if self.code_taken(&draft.codigo_producto, None).await? {
            return Err(CatalogError::DuplicateCode(draft.codigo_producto));
        }
        let id = next_sequence(self.storage.as_ref(), NEXT_ID_KEY).await?;
        let product = draft.into_product(id);
        self.save(&product).await?;
        Ok(product)
    }

    async fn update(&self, id: u64, draft: ProductDraft) -> CatalogResult<Product> {
        if self.get(id).await?.is_none() {
            return Err(CatalogError::NotFound(id));
        }
        if self.code_taken(&draft.codigo_producto, Some(id)).await? {
            return Err(CatalogError::DuplicateCode(draft.codigo_producto));
        }
        let product = draft.into_product(id);
        self.save(&product).await?;
        Ok(product)
    }

    async fn delete(&self, id: u64) -> CatalogResult<()> {
        let key = Self::key_for(id);
        if !self.storage.exists(&key).await? {
            return Err(CatalogError::NotFound(id));
        }
        self.storage.delete(&key).await?;
        Ok(())
    }
}
