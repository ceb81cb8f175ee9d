//! AI and general settings, kept as JSON documents in `StoragePort`.

use std::rc::Rc;

use kairos_types::{
    KioskError, Result,
    settings::{AI_MODELS, AiSettings, GeneralSettings},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::ports::StoragePort;

const AI_KEY: &str = "settings:ia";
const GENERAL_KEY: &str = "settings:general";

pub const ERR_MODEL: &str = "Selecciona un modelo de la lista";
pub const ERR_TEMPERATURE: &str = "La temperatura debe estar entre 0 y 1";
pub const ERR_MAX_TOKENS: &str = "Max tokens debe ser mayor que 0";
pub const ERR_DAILY_LIMIT: &str = "Las consultas por día deben ser al menos 1";
pub const ERR_DAILY_COST: &str = "El costo máximo por día no puede ser negativo";
pub const ERR_API_KEY: &str = "Ingresa la API key para activar la IA";

/// Every problem with an AI settings form, in field order.
pub fn validate_ai(settings: &AiSettings) -> Vec<String> {
    let mut errors = Vec::new();
    if !AI_MODELS.iter().any(|(value, _)| *value == settings.modelo) {
        errors.push(ERR_MODEL.to_string());
    }
    if !(0.0..=1.0).contains(&settings.temperatura) {
        errors.push(ERR_TEMPERATURE.to_string());
    }
    if settings.max_tokens == 0 {
        errors.push(ERR_MAX_TOKENS.to_string());
    }
    if settings.consultas_por_dia == 0 {
        errors.push(ERR_DAILY_LIMIT.to_string());
    }
    if !settings.costo_maximo_dia.is_finite() || settings.costo_maximo_dia < 0.0 {
        errors.push(ERR_DAILY_COST.to_string());
    }
    if settings.activo && settings.api_key.trim().is_empty() {
        errors.push(ERR_API_KEY.to_string());
    }
    errors
}

pub struct SettingsService {
    storage: Rc<dyn StoragePort>,
}

impl SettingsService {
    pub fn new(storage: Rc<dyn StoragePort>) -> Self {
        Self { storage }
    }

    /// Stored AI settings, or the defaults if none were saved yet.
    pub async fn ai(&self) -> Result<AiSettings> {
        self.load(AI_KEY).await
    }

    pub async fn save_ai(&self, settings: &AiSettings) -> Result<AiSettings> {
        let errors = validate_ai(settings);
        if !errors.is_empty() {
            return Err(KioskError::Validation(errors));
        }
        let mut clean = settings.clone();
        clean.api_key = clean.api_key.trim().to_string();
        self.store(AI_KEY, &clean).await?;
        log::info!("AI settings saved (model {}, active: {})", clean.modelo, clean.activo);
        Ok(clean)
    }

    pub async fn general(&self) -> Result<GeneralSettings> {
        self.load(GENERAL_KEY).await
    }

    pub async fn save_general(&self, settings: &GeneralSettings) -> Result<GeneralSettings> {
        let clean = GeneralSettings {
            evento_nombre: settings.evento_nombre.trim().to_string(),
            ubicacion: settings.ubicacion.trim().to_string(),
            ..settings.clone()
        };
        self.store(GENERAL_KEY, &clean).await?;
        log::info!("General settings saved");
        Ok(clean)
    }

    async fn load<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        match self.storage.get(key).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(T::default()),
        }
    }

    async fn store<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.storage.set(key, &serde_json::to_vec(value)?).await
    }
}
