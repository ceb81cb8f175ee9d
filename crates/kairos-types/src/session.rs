use serde::{Deserialize, Serialize};

/// Kiosk screens, one per session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    /// Idle, waiting for a patient
    Espera,
    /// Capturing patient identity
    Datos,
    Chat,
    /// Diagnosis being computed by the backend
    Generando,
    /// Farewell countdown
    Despedida,
    Error,
}

impl Screen {
    pub fn label(&self) -> &'static str {
        match self {
            Screen::Espera => "espera",
            Screen::Datos => "datos",
            Screen::Chat => "chat",
            Screen::Generando => "generando",
            Screen::Despedida => "despedida",
            Screen::Error => "error",
        }
    }
}

/// Backend operations the controller can have in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Start,
    CaptureIdentity,
    SendMessage,
    GenerateDiagnosis,
    PrintReceipt,
    Finalize,
}

impl Operation {
    pub fn label(&self) -> &'static str {
        match self {
            Operation::Start => "start",
            Operation::CaptureIdentity => "capture_identity",
            Operation::SendMessage => "send_message",
            Operation::GenerateDiagnosis => "generate_diagnosis",
            Operation::PrintReceipt => "print_receipt",
            Operation::Finalize => "finalize",
        }
    }
}
