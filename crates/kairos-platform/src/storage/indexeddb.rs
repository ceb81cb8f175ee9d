//! IndexedDB storage backend.
//!
//! Persistent across reloads, so the product catalog survives a kiosk
//! restart. A single `kv` object store holds every key.

use async_trait::async_trait;
use js_sys::{Array, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{IdbDatabase, IdbKeyRange, IdbTransactionMode};

use kairos_core::ports::StoragePort;
use kairos_types::{KioskError, Result};

const DB_NAME: &str = "kairos";
const STORE_NAME: &str = "kv";
const DB_VERSION: u32 = 1;

pub struct IndexedDbStorage {
    db: IdbDatabase,
}

impl IndexedDbStorage {
    /// Open (or create) the IndexedDB database.
    pub async fn open() -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| KioskError::Storage("No window object".to_string()))?;

        let idb_factory = window
            .indexed_db()
            .map_err(idb_error)?
            .ok_or_else(|| KioskError::Storage("IndexedDB not available".to_string()))?;

        let open_req = idb_factory
            .open_with_u32(DB_NAME, DB_VERSION)
            .map_err(idb_error)?;

        // First open (or version bump): create the object store
        let open_req_clone = open_req.clone();
        let onupgrade = Closure::once(move |_event: web_sys::Event| {
            match open_req_clone.result().map(|r| r.dyn_into::<IdbDatabase>()) {
                Ok(Ok(db)) => {
                    if !db.object_store_names().contains(STORE_NAME) {
                        if let Err(e) = db.create_object_store(STORE_NAME) {
                            log::error!("Cannot create object store: {:?}", e);
                        }
                    }
                }
                _ => log::error!("IndexedDB upgrade without a database"),
            }
        });
        open_req.set_onupgradeneeded(Some(onupgrade.as_ref().unchecked_ref()));
        onupgrade.forget();

        let db: IdbDatabase = request_result(&open_req).await?.dyn_into().map_err(idb_error)?;

        log::debug!("IndexedDB '{}' v{} open", DB_NAME, DB_VERSION);
        Ok(Self { db })
    }

    fn transaction(&self, mode: IdbTransactionMode) -> Result<web_sys::IdbObjectStore> {
        self.db
            .transaction_with_str_and_mode(STORE_NAME, mode)
            .and_then(|tx| tx.object_store(STORE_NAME))
            .map_err(idb_error)
    }
}

#[async_trait(?Send)]
impl StoragePort for IndexedDbStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let store = self.transaction(IdbTransactionMode::Readonly)?;
        let req = store.get(&JsValue::from_str(key)).map_err(idb_error)?;
        let value = request_result(&req).await?;
        if value.is_undefined() || value.is_null() {
            Ok(None)
        } else {
            Ok(Some(Uint8Array::new(&value).to_vec()))
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let store = self.transaction(IdbTransactionMode::Readwrite)?;
        let req = store
            .put_with_key(&Uint8Array::from(value), &JsValue::from_str(key))
            .map_err(idb_error)?;
        request_result(&req).await.map(|_| ())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let store = self.transaction(IdbTransactionMode::Readwrite)?;
        let req = store.delete(&JsValue::from_str(key)).map_err(idb_error)?;
        request_result(&req).await.map(|_| ())
    }

    /// Prefix scan as a key range, so only matching keys cross into Rust.
    /// IndexedDB returns them in ascending order.
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        let store = self.transaction(IdbTransactionMode::Readonly)?;
        let req = if prefix.is_empty() {
            store.get_all_keys()
        } else {
            let upper = format!("{}\u{ffff}", prefix);
            let range = IdbKeyRange::bound(&JsValue::from_str(prefix), &JsValue::from_str(&upper))
                .map_err(idb_error)?;
            store.get_all_keys_with_key(&range)
        }
        .map_err(idb_error)?;

        let keys: Array = request_result(&req).await?.dyn_into().map_err(idb_error)?;
        Ok(keys.iter().filter_map(|k| k.as_string()).collect())
    }

    fn backend_name(&self) -> &str {
        "indexeddb"
    }
}

fn idb_error(e: JsValue) -> KioskError {
    KioskError::Storage(format!("{:?}", e))
}

/// Await a request and hand back its `result`.
async fn request_result(req: &web_sys::IdbRequest) -> Result<JsValue> {
    JsFuture::from(idb_request_to_promise(req)).await.map_err(idb_error)
}

/// Bridge the callback-style IDB request into a Promise for `JsFuture`.
fn idb_request_to_promise(req: &web_sys::IdbRequest) -> js_sys::Promise {
    let req_for_success = req.clone();
    let req_for_callbacks = req.clone();

    let promise = js_sys::Promise::new(&mut move |resolve, reject| {
        let req_inner = req_for_success.clone();
        let onsuccess = Closure::once(move |_: web_sys::Event| {
            let _ = resolve.call1(
                &JsValue::NULL,
                &req_inner.result().unwrap_or(JsValue::UNDEFINED),
            );
        });
        let onerror = Closure::once(move |_: web_sys::Event| {
            let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("IndexedDB request failed"));
        });
        req_for_callbacks.set_onsuccess(Some(onsuccess.as_ref().unchecked_ref()));
        req_for_callbacks.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onsuccess.forget();
        onerror.forget();
    });
    promise
}
