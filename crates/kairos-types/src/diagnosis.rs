//! Diagnosis payload returned by the backend.
//!
//! Every field is optional on the wire: missing keys fall back to their
//! defaults and unknown keys are ignored, so renderers work against named
//! fields instead of probing a loose JSON bag.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosisResult {
    pub diagnostico: Option<String>,
    /// Either a 0..=1 ratio or an already-scaled percentage
    pub confianza: Option<f64>,
    pub causas: Vec<String>,
    pub explicacion_causas: Option<String>,
    pub productos: Vec<RecommendedProduct>,
    pub plantas: Vec<RecommendedPlant>,
    pub remedios: Vec<HomeRemedy>,
    pub consejos_dieta: Vec<String>,
    pub consejos_habitos: Vec<String>,
    pub tiempo_mejoria: Option<String>,
    pub advertencias: Vec<String>,
    pub cuando_ver_medico: Option<String>,
    pub consulta_id: Option<u64>,
}

impl DiagnosisResult {
    /// Confidence as a whole percentage, if the backend sent one.
    pub fn confidence_percent(&self) -> Option<u32> {
        self.confianza.map(|c| {
            let pct = if c <= 1.0 { c * 100.0 } else { c };
            pct.clamp(0.0, 100.0).round() as u32
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendedProduct {
    pub id: Option<u64>,
    pub nombre: String,
    pub precio: Option<f64>,
    pub dosis: Option<String>,
    pub cuando_tomar: Option<String>,
    pub duracion: Option<String>,
    pub como_tomar: Option<String>,
    pub cuando_hace_efecto: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendedPlant {
    pub id: Option<u64>,
    pub nombre_comun: String,
    pub nombre_cientifico: Option<String>,
    pub propiedades: Option<String>,
    pub dosis: Option<String>,
    pub forma_uso: Option<String>,
    pub preparacion: Option<String>,
    pub cuando_tomar: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeRemedy {
    pub id: Option<u64>,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub ingredientes: Option<String>,
    pub preparacion: Option<String>,
}
