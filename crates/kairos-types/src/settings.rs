use serde::{Deserialize, Serialize};

/// Model choices offered by the AI settings form: (value, label)
pub const AI_MODELS: &[(&str, &str)] = &[
    ("gpt-4o-mini", "GPT-4o Mini (económico y rápido)"),
    ("gpt-4o", "GPT-4o (más completo)"),
    ("gpt-4-turbo", "GPT-4 Turbo"),
    ("gpt-4", "GPT-4 (más preciso, más caro)"),
    ("gpt-3.5-turbo", "GPT-3.5 Turbo (antiguo)"),
];

/// Limits and model parameters for the backend's GPT fallback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    pub api_key: String,
    pub modelo: String,
    /// 0 = precise, 1 = creative
    pub temperatura: f32,
    pub max_tokens: u32,
    pub activo: bool,
    pub consultas_por_dia: u32,
    /// Daily spend cap in USD
    pub costo_maximo_dia: f64,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            modelo: "gpt-4o-mini".to_string(),
            temperatura: 0.7,
            max_tokens: 1000,
            activo: false,
            consultas_por_dia: 100,
            costo_maximo_dia: 10.0,
        }
    }
}

/// Event details and kiosk behaviour toggles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    pub evento_nombre: String,
    pub ubicacion: String,
    pub voz_activa: bool,
    pub modo_offline: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            evento_nombre: String::new(),
            ubicacion: String::new(),
            voz_activa: true,
            modo_offline: false,
        }
    }
}
