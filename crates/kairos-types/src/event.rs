use serde::{Deserialize, Serialize};

use crate::message::ChatMessage;
use crate::session::Screen;

/// Events emitted by the session controller.
/// The UI drains these each frame for reactive updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KioskEvent {
    ScreenChanged { screen: Screen },

    SessionStarted { session_id: String },

    /// Identity accepted by the backend
    PatientCaptured { nombre: String, dni_label: String },

    /// Local or backend validation rejected the identity form
    Validation { messages: Vec<String> },

    MessageAppended { message: ChatMessage },

    /// "Assistant is typing" indicator
    Typing { active: bool },

    DiagnosisReady,

    FarewellTick { remaining: u32, name: String },

    StatisticsUpdated { total_consultas: u64 },

    /// Controller cleared all session state; bound form fields must be emptied
    SessionReset,

    Error { message: String },
}
