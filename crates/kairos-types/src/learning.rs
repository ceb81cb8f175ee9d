//! What the backend has learned: intent patterns, training runs and cached
//! GPT answers. The admin loads these from the backend's JSON export.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedPattern {
    pub id: u64,
    pub intencion_detectada: String,
    #[serde(default)]
    pub texto_ejemplo: String,
    #[serde(default)]
    pub veces_visto: u64,
    #[serde(default)]
    pub confianza: f64,
    #[serde(default, with = "crate::timestamp::option")]
    pub ultima_vez_visto: Option<NaiveDateTime>,
    #[serde(default)]
    pub origen: Option<String>,
    #[serde(default, with = "crate::timestamp::option")]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRun {
    #[serde(with = "crate::timestamp")]
    pub fecha: NaiveDateTime,
    #[serde(default)]
    pub tipo_entrenamiento: String,
    #[serde(default)]
    pub num_muestras: u64,
    #[serde(default)]
    pub precision_alcanzada: f64,
    #[serde(default)]
    pub duracion_segundos: u64,
}

/// A GPT answer the backend reuses for repeated symptoms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedKnowledge {
    pub id: u64,
    pub sintoma_consulta: String,
    #[serde(default)]
    pub respuesta_gpt: String,
    #[serde(default)]
    pub veces_usado: u64,
    #[serde(default)]
    pub costo_tokens: f64,
    #[serde(default, with = "crate::timestamp::option")]
    pub created_at: Option<NaiveDateTime>,
}

/// The backend's learning export. Every section may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningExport {
    pub patrones: Vec<LearnedPattern>,
    pub entrenamientos: Vec<TrainingRun>,
    pub conocimientos: Vec<CachedKnowledge>,
}
