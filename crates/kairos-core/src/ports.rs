//! Port traits: the hexagonal architecture boundary.
//!
//! These traits are defined here in `kairos-core` (pure Rust).
//! Implementations live in `kairos-platform` (browser adapters).
//! The core never imports platform code; it only depends on these traits.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use kairos_types::{
    CatalogError, Result,
    api::{BackendInfo, CapturePayload, FinalizePayload, MessageReply, NewSessionPayload, ReceiptPayload, Statistics},
    diagnosis::DiagnosisResult,
    history::ConsultationRecord,
    learning::LearningExport,
    product::{Product, ProductDraft},
    usage::UsageLogEntry,
};

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

// ─── Backend Port ────────────────────────────────────────────

/// Gateway to the external diagnostic backend.
///
/// Implementations unwrap the `{success, ...}` envelope: `success: false`
/// becomes `KioskError::Backend`, transport failures `KioskError::Network`.
/// No retries, no backoff.
#[async_trait(?Send)]
pub trait BackendPort {
    async fn new_session(&self, device: &str) -> Result<NewSessionPayload>;

    async fn capture_patient(
        &self,
        session_id: &str,
        nombre: &str,
        dni: &str,
        edad: Option<u32>,
    ) -> Result<CapturePayload>;

    async fn send_message(&self, session_id: &str, text: &str) -> Result<MessageReply>;

    async fn generate_diagnosis(&self, session_id: &str) -> Result<DiagnosisResult>;

    async fn print_receipt(&self, session_id: &str) -> Result<ReceiptPayload>;

    async fn finalize_session(&self, session_id: &str) -> Result<FinalizePayload>;

    async fn statistics(&self) -> Result<Statistics>;

    async fn backend_info(&self) -> Result<BackendInfo>;

    /// `true` when the backend answers its health endpoint. Never errors.
    async fn health_check(&self) -> bool;
}

// ─── Voice Port ──────────────────────────────────────────────

/// Speech recognition and synthesis.
///
/// Text handed to `speak` is already sanitized by the caller.
#[async_trait(?Send)]
pub trait VoicePort {
    /// Platform supports speech at all
    fn is_available(&self) -> bool;

    fn is_enabled(&self) -> bool;

    fn set_enabled(&self, enabled: bool);

    /// Speak, cancelling anything still being spoken
    fn speak(&self, text: &str);

    fn cancel(&self);

    /// Single-shot recognition: one transcript, no interim results
    async fn listen(&self) -> Result<String>;
}

// ─── Clock Port ──────────────────────────────────────────────

pub trait ClockPort {
    /// Milliseconds since the Unix epoch
    fn now_ms(&self) -> u64;

    /// Wall-clock time `utc_offset_minutes` away from UTC.
    fn local_datetime(&self, utc_offset_minutes: i32) -> NaiveDateTime {
        let shifted = self.now_ms() as i64 + i64::from(utc_offset_minutes) * 60_000;
        DateTime::<Utc>::from_timestamp_millis(shifted)
            .map(|dt| dt.naive_utc())
            .unwrap_or_default()
    }

    fn local_date(&self, utc_offset_minutes: i32) -> NaiveDate {
        self.local_datetime(utc_offset_minutes).date()
    }
}

// ─── Storage Port ────────────────────────────────────────────

#[async_trait(?Send)]
pub trait StoragePort {
    /// Get a value by key
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Set a value
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Delete a value
    async fn delete(&self, key: &str) -> Result<()>;

    /// List keys with a given prefix
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>>;

    /// Check if a key exists
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Name of this backend (for logging/debug)
    fn backend_name(&self) -> &str;
}

// ─── Catalog Port ────────────────────────────────────────────

/// Product catalog store.
///
/// `insert` and `update` enforce code uniqueness themselves and report a
/// violation as `CatalogError::DuplicateCode`, whatever the caller pre-checked.
#[async_trait(?Send)]
pub trait CatalogPort {
    async fn list(&self) -> CatalogResult<Vec<Product>>;

    async fn get(&self, id: u64) -> CatalogResult<Option<Product>>;

    async fn find_by_code(&self, code: &str) -> CatalogResult<Option<Product>>;

    async fn insert(&self, draft: ProductDraft) -> CatalogResult<Product>;

    async fn update(&self, id: u64, draft: ProductDraft) -> CatalogResult<Product>;

    async fn delete(&self, id: u64) -> CatalogResult<()>;
}

// ─── Usage Log Port ──────────────────────────────────────────

/// Read-only view of the AI usage log written by the backend.
#[async_trait(?Send)]
pub trait UsageLogPort {
    async fn entries(&self) -> Result<Vec<UsageLogEntry>>;
}

// ─── Consultation History Port ───────────────────────────────

/// Consultations exported by the backend, keyed by their backend id.
#[async_trait(?Send)]
pub trait ConsultationLogPort {
    async fn consultations(&self) -> Result<Vec<ConsultationRecord>>;

    async fn consultation(&self, id: u64) -> Result<Option<ConsultationRecord>> {
        Ok(self.consultations().await?.into_iter().find(|c| c.id == id))
    }
}

// ─── Learning Port ───────────────────────────────────────────

/// The backend's learned patterns, training runs and knowledge cache.
#[async_trait(?Send)]
pub trait LearningPort {
    async fn learning(&self) -> Result<LearningExport>;
}
