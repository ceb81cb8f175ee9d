//! Serde helpers for the backend's timestamps.
//!
//! MySQL `DATETIME` columns and Python's `str(datetime)` both write
//! `2024-03-15 10:00:00`; JSON encoders write `2024-03-15T10:00:00`, possibly
//! with fractional seconds. Both are accepted. Values are written back in the
//! backend's space-separated form.
//!
//! ```ignore
//! #[serde(with = "crate::timestamp")]
//! pub fecha: NaiveDateTime,
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serializer, de::Error};

pub const BACKEND_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const ACCEPTED_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a backend timestamp. A trailing `Z` is tolerated.
pub fn parse(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim().trim_end_matches('Z');
    ACCEPTED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.format(BACKEND_FORMAT).to_string())
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| D::Error::custom(format!("fecha no reconocida: '{}'", raw)))
}

/// Same rules for nullable columns; `null` and `""` both read as `None`.
pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => super::serialize(dt, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("fecha no reconocida: '{}'", raw))),
        }
    }
}
