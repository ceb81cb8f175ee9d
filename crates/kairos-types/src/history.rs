use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One consultation as exported by the backend, already joined with its
/// patient, diagnosis and kiosk session rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsultationRecord {
    pub id: u64,
    #[serde(with = "crate::timestamp", alias = "fecha_consulta")]
    pub fecha: NaiveDateTime,
    #[serde(default)]
    pub sintoma_principal: String,
    #[serde(default)]
    pub sintomas_adicionales: Option<String>,
    #[serde(default)]
    pub notas: Option<String>,

    #[serde(default)]
    pub paciente: Option<String>,
    #[serde(default)]
    pub dni: Option<String>,
    #[serde(default)]
    pub edad: Option<u32>,
    #[serde(default)]
    pub telefono: Option<String>,

    #[serde(default, alias = "diagnostico_kairos")]
    pub condicion_detectada: Option<String>,
    /// Ratio in `0..=1`
    #[serde(default)]
    pub confianza: Option<f64>,
    #[serde(default)]
    pub causas_probables: Option<String>,
    #[serde(default)]
    pub recomendaciones_generales: Option<String>,
    #[serde(default)]
    pub alimentacion_recomendada: Option<String>,
    #[serde(default)]
    pub habitos_sugeridos: Option<String>,

    #[serde(default)]
    pub evento: Option<String>,
    #[serde(default)]
    pub ubicacion: Option<String>,
    #[serde(default)]
    pub dispositivo: Option<String>,
    #[serde(default)]
    pub duracion_minutos: Option<u32>,

    #[serde(default)]
    pub productos: Vec<RecommendedProduct>,
}

impl ConsultationRecord {
    pub fn patient_label(&self) -> &str {
        self.paciente
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("Anónimo")
    }
}

/// A product the diagnosis recommended, with the dose tailored to the patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedProduct {
    pub nombre: String,
    #[serde(default)]
    pub precio: f64,
    #[serde(default)]
    pub dosis_personalizada: Option<String>,
    #[serde(default)]
    pub duracion_tratamiento: Option<String>,
}
