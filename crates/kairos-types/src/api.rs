//! Wire types for the diagnostic backend's JSON API.
//!
//! Every response is wrapped in a `{success, ...}` envelope; the payload
//! structs below describe what sits next to `success` on the happy path.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::diagnosis::DiagnosisResult;

pub const NEW_SESSION: &str = "/api/sesion/nueva";
pub const CAPTURE_PATIENT: &str = "/api/sesion/capturar-datos";
pub const MESSAGE: &str = "/api/sesion/mensaje";
pub const DIAGNOSIS: &str = "/api/sesion/diagnostico";
pub const PRINT_RECEIPT: &str = "/api/sesion/imprimir";
pub const FINALIZE: &str = "/api/sesion/finalizar";
pub const STATISTICS: &str = "/api/estadisticas";
pub const CONFIG: &str = "/api/config";
pub const HEALTH: &str = "/api/health";

/// Raw response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

// ─── Requests ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct NewSessionRequest<'a> {
    pub dispositivo: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaptureRequest<'a> {
    pub sesion_id: &'a str,
    pub nombre: &'a str,
    pub dni: &'a str,
    pub edad: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageRequest<'a> {
    pub sesion_id: &'a str,
    pub mensaje: &'a str,
}

/// Body for endpoints that only need the session id
#[derive(Debug, Clone, Serialize)]
pub struct SessionRequest<'a> {
    pub sesion_id: &'a str,
}

// ─── Responses ───────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct NewSessionPayload {
    pub sesion_id: String,
    #[serde(default)]
    pub info: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CapturePayload {
    #[serde(default)]
    pub info: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagePayload {
    pub resultado: MessageReply,
}

/// Assistant reply to one patient turn
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageReply {
    pub respuesta: String,
    /// Backend has gathered enough to diagnose
    #[serde(default)]
    pub diagnostico_listo: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosisPayload {
    pub diagnostico: DiagnosisResult,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReceiptPayload {
    #[serde(default)]
    pub info: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinalizePayload {
    #[serde(default)]
    pub resumen: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatisticsPayload {
    #[serde(default)]
    pub estadisticas: Statistics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(default)]
    pub total_consultas: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigPayload {
    pub config: BackendInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendInfo {
    pub sistema: Option<String>,
    pub gpt_activo: bool,
    pub sesiones_activas: u64,
}
