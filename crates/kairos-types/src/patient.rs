use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity captured once per session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSnapshot {
    pub nombre: String,
    pub dni: String,
    pub edad: Option<u32>,
    /// Extra data echoed by the backend on capture, kept verbatim
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub info: Value,
}

impl PatientSnapshot {
    /// First word of the name, used in greetings.
    pub fn first_name(&self) -> &str {
        self.nombre.split_whitespace().next().unwrap_or("")
    }

    pub fn dni_label(&self) -> String {
        format!("DNI: {}", self.dni)
    }
}
