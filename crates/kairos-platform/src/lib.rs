//! Browser adapters for the kairos-core ports.

pub mod api;
pub mod catalog;
pub mod clock;
pub mod consultations;
pub mod download;
pub mod env;
pub mod learning;
pub mod storage;
pub mod usage_log;
pub mod voice;

pub use api::HttpBackend;
pub use catalog::StorageCatalog;
pub use clock::BrowserClock;
pub use consultations::StorageConsultationLog;
pub use learning::StorageLearning;
pub use usage_log::StorageUsageLog;
pub use voice::WebSpeechVoice;
