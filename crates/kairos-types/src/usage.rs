use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One AI call logged by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageLogEntry {
    #[serde(with = "crate::timestamp")]
    pub fecha_consulta: NaiveDateTime,
    #[serde(default)]
    pub sintoma: Option<String>,
    pub modelo: String,
    #[serde(default)]
    pub tokens_usados: u64,
    #[serde(default)]
    pub costo_estimado: f64,
    #[serde(default)]
    pub tiempo_respuesta_ms: u64,
    #[serde(default)]
    pub exitosa: bool,
}
