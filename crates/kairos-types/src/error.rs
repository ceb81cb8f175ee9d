use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KioskError {
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with `success: false`
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Another backend operation is still in flight
    #[error("Operation already in progress: {0}")]
    Busy(String),

    #[error("No active session")]
    NoSession,

    #[error("Cannot {operation} while on screen '{screen}'")]
    InvalidState { operation: String, screen: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Voice error: {0}")]
    Voice(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JS interop error: {0}")]
    JsInterop(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for KioskError {
    fn from(e: serde_json::Error) -> Self {
        KioskError::Serialization(e.to_string())
    }
}

/// Errors raised by the product catalog store and service.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// Unique constraint on `codigo_producto` violated
    #[error("Duplicate product code: {0}")]
    DuplicateCode(String),

    #[error("Product not found: {0}")]
    NotFound(u64),

    #[error("Invalid product: {}", .0.join("; "))]
    Invalid(Vec<String>),

    #[error("Store error: {0}")]
    Store(String),
}

impl From<KioskError> for CatalogError {
    fn from(e: KioskError) -> Self {
        CatalogError::Store(e.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Store(e.to_string())
    }
}
