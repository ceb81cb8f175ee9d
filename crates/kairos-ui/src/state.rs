//! UI-level state that drives rendering.
//! This is a read-only projection of the session controller,
//! updated each frame by draining the EventBus. Form inputs live here too.

use kairos_types::event::KioskEvent;
use kairos_types::message::ChatMessage;
use kairos_types::session::Screen;
use kairos_types::settings::GeneralSettings;

use crate::action::DictationTarget;
use crate::admin::AdminState;

/// State visible to UI panels
pub struct UiState {
    pub screen: Screen,
    pub messages: Vec<ChatMessage>,
    /// Assistant typing indicator
    pub typing: bool,
    /// Shown in the chat header once identity is captured
    pub patient_name: String,
    pub dni_label: String,
    /// Itemized identity-form errors
    pub validation: Vec<String>,
    pub error_message: Option<String>,
    pub farewell_remaining: u32,
    pub farewell_name: String,
    pub diagnosis_ready: bool,
    /// Consultations today, as reported by the backend
    pub total_consultas: Option<u64>,
    /// Event name and location under the welcome title
    pub event_banner: Option<String>,

    // Bound inputs
    pub nombre_input: String,
    pub dni_input: String,
    pub edad_input: String,
    pub message_input: String,

    /// Controller has a backend call in flight (set by the app each frame)
    pub busy: bool,
    pub voice_available: bool,
    pub voice_enabled: bool,
    pub dictating: Option<DictationTarget>,

    pub show_admin: bool,
    pub admin: AdminState,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Espera,
            messages: Vec::new(),
            typing: false,
            patient_name: String::new(),
            dni_label: String::new(),
            validation: Vec::new(),
            error_message: None,
            farewell_remaining: 0,
            farewell_name: String::new(),
            diagnosis_ready: false,
            total_consultas: None,
            event_banner: None,
            nombre_input: String::new(),
            dni_input: String::new(),
            edad_input: String::new(),
            message_input: String::new(),
            busy: false,
            voice_available: false,
            voice_enabled: false,
            dictating: None,
            show_admin: false,
            admin: AdminState::new(),
        }
    }

    /// Process events from the EventBus and update UI state
    pub fn process_events(&mut self, events: Vec<KioskEvent>) {
        for event in events {
            match event {
                KioskEvent::ScreenChanged { screen } => {
                    self.screen = screen;
                }
                KioskEvent::SessionStarted { .. } => {
                    self.validation.clear();
                }
                KioskEvent::PatientCaptured { nombre, dni_label } => {
                    self.patient_name = nombre;
                    self.dni_label = dni_label;
                    self.validation.clear();
                }
                KioskEvent::Validation { messages } => {
                    self.validation = messages;
                }
                KioskEvent::MessageAppended { message } => {
                    self.messages.push(message);
                }
                KioskEvent::Typing { active } => {
                    self.typing = active;
                }
                KioskEvent::DiagnosisReady => {
                    self.diagnosis_ready = true;
                }
                KioskEvent::FarewellTick { remaining, name } => {
                    self.farewell_remaining = remaining;
                    self.farewell_name = name;
                }
                KioskEvent::StatisticsUpdated { total_consultas } => {
                    self.total_consultas = Some(total_consultas);
                }
                KioskEvent::SessionReset => self.clear_session(),
                KioskEvent::Error { message } => {
                    self.typing = false;
                    self.error_message = Some(message);
                }
            }
        }
    }

    /// Write a dictation result into the field it was started for.
    pub fn apply_dictation(&mut self, target: DictationTarget, text: &str) {
        let field = match target {
            DictationTarget::Nombre => &mut self.nombre_input,
            DictationTarget::Dni => &mut self.dni_input,
            DictationTarget::Edad => &mut self.edad_input,
            DictationTarget::Message => &mut self.message_input,
        };
        match target {
            // spoken numbers arrive as "12 34 56 78"
            DictationTarget::Dni | DictationTarget::Edad => {
                *field = text.chars().filter(char::is_ascii_digit).collect();
            }
            DictationTarget::Nombre | DictationTarget::Message => {
                *field = text.trim().to_string();
            }
        }
    }

    /// Show the configured event on the welcome screen.
    pub fn apply_general(&mut self, general: &GeneralSettings) {
        let parts: Vec<&str> = [general.evento_nombre.as_str(), general.ubicacion.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        self.event_banner = (!parts.is_empty()).then(|| parts.join(" · "));
    }

    /// Consultation in progress, i.e. the admin entry point must stay hidden
    pub fn in_session(&self) -> bool {
        !matches!(self.screen, Screen::Espera | Screen::Error)
    }

    fn clear_session(&mut self) {
        self.messages.clear();
        self.typing = false;
        self.patient_name.clear();
        self.dni_label.clear();
        self.validation.clear();
        self.error_message = None;
        self.farewell_remaining = 0;
        self.farewell_name.clear();
        self.diagnosis_ready = false;
        self.nombre_input.clear();
        self.dni_input.clear();
        self.edad_input.clear();
        self.message_input.clear();
        self.dictating = None;
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}
