//! HTTP client for the diagnostic backend.
//!
//! One configured base URL, JSON in and out, `{success, ...}` envelopes
//! unwrapped by `kairos_core::envelope`. Uses browser `fetch()` via gloo-net.
//! No retries, no backoff, no client-side timeout.

use async_trait::async_trait;
use gloo_net::http::{Request, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use kairos_core::envelope::unwrap_envelope;
use kairos_core::ports::BackendPort;
use kairos_types::{
    KioskError, Result,
    api::{self, *},
    config::KioskConfig,
    diagnosis::DiagnosisResult,
};

/// Stateless backend client; the session id travels with every call.
pub struct HttpBackend {
    base_url: String,
    debug: bool,
}

impl HttpBackend {
    pub fn new(config: &KioskConfig) -> Self {
        Self {
            base_url: config.base_url().to_string(),
            debug: config.debug,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B, fallback: &str) -> Result<T> {
        let url = self.url(path);
        if self.debug {
            log::debug!("POST {} {}", url, serde_json::to_string(body).unwrap_or_default());
        }

        let response = Request::post(&url)
            .header("Content-Type", "application/json")
            .json(body)
            .map_err(|e| KioskError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| KioskError::Network(e.to_string()))?;

        self.read(path, response, fallback).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, fallback: &str) -> Result<T> {
        let url = self.url(path);
        if self.debug {
            log::debug!("GET {}", url);
        }

        let response = Request::get(&url)
            .send()
            .await
            .map_err(|e| KioskError::Network(e.to_string()))?;

        self.read(path, response, fallback).await
    }

    /// Error statuses still carry an envelope worth reading; only a body
    /// that is not JSON turns into a transport error.
    async fn read<T: DeserializeOwned>(&self, path: &str, response: Response, fallback: &str) -> Result<T> {
        let status = response.status();
        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) if response.ok() => return Err(KioskError::Network(e.to_string())),
            Err(_) => return Err(KioskError::Network(format!("HTTP {} from {}", status, path))),
        };

        if self.debug {
            log::debug!("{} ← HTTP {} {}", path, status, body);
        }

        unwrap_envelope(body, fallback)
    }
}

#[async_trait(?Send)]
impl BackendPort for HttpBackend {
    async fn new_session(&self, device: &str) -> Result<NewSessionPayload> {
        self.post(
            api::NEW_SESSION,
            &NewSessionRequest { dispositivo: device },
            "No se pudo crear la sesión",
        )
        .await
    }

    async fn capture_patient(
        &self,
        session_id: &str,
        nombre: &str,
        dni: &str,
        edad: Option<u32>,
    ) -> Result<CapturePayload> {
        let body = CaptureRequest {
            sesion_id: session_id,
            nombre,
            dni,
            edad,
        };
        self.post(api::CAPTURE_PATIENT, &body, "Error capturando datos").await
    }

    async fn send_message(&self, session_id: &str, text: &str) -> Result<MessageReply> {
        let body = MessageRequest {
            sesion_id: session_id,
            mensaje: text,
        };
        let payload: MessagePayload = self.post(api::MESSAGE, &body, "Error enviando mensaje").await?;
        Ok(payload.resultado)
    }

    async fn generate_diagnosis(&self, session_id: &str) -> Result<DiagnosisResult> {
        let body = SessionRequest { sesion_id: session_id };
        let payload: DiagnosisPayload = self.post(api::DIAGNOSIS, &body, "Error generando diagnóstico").await?;
        Ok(payload.diagnostico)
    }

    async fn print_receipt(&self, session_id: &str) -> Result<ReceiptPayload> {
        let body = SessionRequest { sesion_id: session_id };
        self.post(api::PRINT_RECEIPT, &body, "Error imprimiendo receta").await
    }

    async fn finalize_session(&self, session_id: &str) -> Result<FinalizePayload> {
        let body = SessionRequest { sesion_id: session_id };
        self.post(api::FINALIZE, &body, "Error finalizando sesión").await
    }

    async fn statistics(&self) -> Result<Statistics> {
        let payload: StatisticsPayload = self.get(api::STATISTICS, "Error obteniendo estadísticas").await?;
        Ok(payload.estadisticas)
    }

    async fn backend_info(&self) -> Result<BackendInfo> {
        let payload: ConfigPayload = self.get(api::CONFIG, "Error obteniendo configuración").await?;
        Ok(payload.config)
    }

    async fn health_check(&self) -> bool {
        match Request::get(&self.url(api::HEALTH)).send().await {
            Ok(response) => response.ok(),
            Err(e) => {
                log::warn!("Health check failed: {}", e);
                false
            }
        }
    }
}
