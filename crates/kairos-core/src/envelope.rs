//! Unwrapping of the backend's `{success, ...}` response envelope.

use serde::de::DeserializeOwned;
use serde_json::Value;
use kairos_types::{KioskError, Result, api::Envelope};

/// Check `success` and decode the rest of the envelope into `T`.
///
/// A `success: false` (or missing) envelope becomes `KioskError::Backend`
/// carrying the most specific message the backend gave, else `fallback`.
pub fn unwrap_envelope<T: DeserializeOwned>(body: Value, fallback: &str) -> Result<T> {
    let envelope: Envelope = serde_json::from_value(body)?;
    if !envelope.success {
        return Err(KioskError::Backend(failure_message(&envelope, fallback)));
    }
    Ok(serde_json::from_value(Value::Object(envelope.payload))?)
}

/// Best human-readable reason for a failed envelope.
pub fn failure_message(envelope: &Envelope, fallback: &str) -> String {
    if let Some(error) = envelope.error.as_deref().filter(|e| !e.trim().is_empty()) {
        return error.to_string();
    }
    envelope
        .payload
        .get("info")
        .and_then(|info| info.get("errores"))
        .and_then(Value::as_array)
        .and_then(|errs| errs.first())
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| fallback.to_string())
}
