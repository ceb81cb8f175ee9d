//! Consultation session controller: the kiosk state machine.
//!
//! Drives one patient through the screens:
//! `Espera → Datos → Chat → Generando → Chat → Despedida → Espera`,
//! with `Error` reachable from any failed backend call.
//!
//! The controller is single-flight: at most one backend operation runs at a
//! time, and a second request fails fast with `KioskError::Busy`. Every reset
//! bumps an epoch, and replies that belong to an older epoch are dropped.
//! Shared state lives behind `Rc<RefCell<_>>`; no borrow is held across an
//! `.await`, so UI reads stay possible while a request is pending.
//!
//! Timers are deadlines checked by `poll_timers()` against the injected
//! clock. The app pumps `tick()` once per second.

use std::cell::RefCell;
use std::rc::Rc;

use kairos_types::{
    KioskError, Result,
    api::BackendInfo,
    config::{KioskConfig, Timings},
    diagnosis::DiagnosisResult,
    event::KioskEvent,
    message::ChatMessage,
    patient::PatientSnapshot,
    session::{Operation, Screen},
};
use crate::event_bus::EventBus;
use crate::ports::{BackendPort, ClockPort, VoicePort};
use crate::render::{render_diagnosis, spoken_summary};
use crate::speech::SpeechPipeline;
use crate::validation::validate_identity;

pub const FAREWELL_TICK_MS: u64 = 1_000;
pub const FAREWELL_FALLBACK_NAME: &str = "Paciente";

pub const MSG_START_FAILED: &str = "No se pudo iniciar sesión";
pub const MSG_CONNECTION: &str = "Error de conexión con el servidor";
pub const MSG_SEND_FAILED: &str = "Error enviando mensaje";
pub const MSG_DIAGNOSIS_FAILED: &str = "Error generando diagnóstico";
pub const MSG_BACKEND_DOWN: &str = "No se pudo conectar con el servidor";
pub const MSG_RECEIPT_PRINTED: &str = "Tu receta se está imprimiendo. Recógela en la bandeja de la impresora.";
pub const MSG_RECEIPT_FAILED: &str = "No se pudo imprimir la receta. Puedes solicitarla en caja.";

/// Everything the controller knows about the current session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub screen: Screen,
    pub session_id: Option<String>,
    pub patient: Option<PatientSnapshot>,
    pub messages: Vec<ChatMessage>,
    pub diagnosis: Option<DiagnosisResult>,
    pub typing: bool,
    /// Itemized identity-form errors
    pub validation: Vec<String>,
    pub error_message: Option<String>,
    pub in_flight: Option<Operation>,
    /// Deadline for the automatic diagnosis after a "ready" signal
    pub pending_diagnosis_at: Option<u64>,
    pub farewell: Option<Farewell>,
    pub last_activity_ms: u64,
    pub epoch: u64,
}

impl SessionState {
    fn idle(now_ms: u64) -> Self {
        Self {
            screen: Screen::Espera,
            session_id: None,
            patient: None,
            messages: Vec::new(),
            diagnosis: None,
            typing: false,
            validation: Vec::new(),
            error_message: None,
            in_flight: None,
            pending_diagnosis_at: None,
            farewell: None,
            last_activity_ms: now_ms,
            epoch: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Farewell {
    pub remaining: u32,
    pub next_tick_at: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetReason {
    Manual,
    Inactivity,
    FarewellFinished,
}

/// What `poll_timers` did or wants done
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// The delayed diagnosis is due; the caller must run `generate_diagnosis`
    GenerateDiagnosis,
    FarewellTick { remaining: u32 },
    Reset(ResetReason),
}

/// Marks an operation as in flight until dropped.
struct FlightGuard {
    state: Rc<RefCell<SessionState>>,
    op: Operation,
    epoch: u64,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        let mut st = self.state.borrow_mut();
        if st.epoch == self.epoch && st.in_flight == Some(self.op) {
            st.in_flight = None;
        }
    }
}

/// The session controller. Clone-cheap; clones share one session.
#[derive(Clone)]
pub struct SessionController {
    state: Rc<RefCell<SessionState>>,
    backend: Rc<dyn BackendPort>,
    voice: Rc<dyn VoicePort>,
    clock: Rc<dyn ClockPort>,
    event_bus: EventBus,
    speech: Rc<SpeechPipeline>,
    timings: Timings,
    device: String,
}

impl SessionController {
    pub fn new(
        config: &KioskConfig,
        backend: Rc<dyn BackendPort>,
        voice: Rc<dyn VoicePort>,
        clock: Rc<dyn ClockPort>,
        event_bus: EventBus,
    ) -> Self {
        let now = clock.now_ms();
        Self {
            state: Rc::new(RefCell::new(SessionState::idle(now))),
            backend,
            voice,
            clock,
            event_bus,
            speech: Rc::new(SpeechPipeline::spanish()),
            timings: config.timings.clone(),
            device: config.device.clone(),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn screen(&self) -> Screen {
        self.state.borrow().screen
    }

    pub fn is_busy(&self) -> bool {
        self.state.borrow().in_flight.is_some()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    // ─── Transitions ─────────────────────────────────────────

    /// Ask the backend for a new session and move to identity capture.
    pub async fn start(&self) -> Result<()> {
        self.touch();
        self.require_screen(Operation::Start, &[Screen::Espera])?;
        let guard = self.begin(Operation::Start)?;

        let result = self.backend.new_session(&self.device).await;
        if self.is_stale(&guard) {
            return Ok(());
        }

        match result {
            Ok(payload) => {
                log::info!("Session created: {}", payload.sesion_id);
                self.state.borrow_mut().session_id = Some(payload.sesion_id.clone());
                self.event_bus.emit(KioskEvent::SessionStarted {
                    session_id: payload.sesion_id,
                });
                self.set_screen(Screen::Datos);
                Ok(())
            }
            Err(e) => {
                log::error!("Session start failed: {}", e);
                self.fail(MSG_START_FAILED);
                Err(e)
            }
        }
    }

    /// Validate and submit the patient identity.
    ///
    /// Local validation failures never reach the backend.
    pub async fn capture_identity(&self, nombre: &str, dni: &str, edad: Option<i32>) -> Result<()> {
        self.touch();
        self.require_screen(Operation::CaptureIdentity, &[Screen::Datos])?;

        let nombre = nombre.trim();
        let dni = dni.trim();
        let errors = validate_identity(nombre, dni, edad);
        if !errors.is_empty() {
            self.show_validation(errors.clone());
            return Err(KioskError::Validation(errors));
        }

        let session_id = self.session_id()?;
        let guard = self.begin(Operation::CaptureIdentity)?;

        // validated to 0..=120 above
        let edad = edad.map(|a| a as u32);
        let result = self.backend.capture_patient(&session_id, nombre, dni, edad).await;
        if self.is_stale(&guard) {
            return Ok(());
        }

        match result {
            Ok(payload) => {
                let patient = PatientSnapshot {
                    nombre: nombre.to_string(),
                    dni: dni.to_string(),
                    edad,
                    info: payload.info,
                };
                let greeting = format!("Hola {}! ¿En qué puedo ayudarte hoy?", patient.first_name());
                let dni_label = patient.dni_label();
                {
                    let mut st = self.state.borrow_mut();
                    st.validation.clear();
                    st.patient = Some(patient);
                }
                log::info!("Patient captured for session {}", session_id);
                self.event_bus.emit(KioskEvent::PatientCaptured {
                    nombre: nombre.to_string(),
                    dni_label,
                });
                self.set_screen(Screen::Chat);
                self.append(ChatMessage::assistant(greeting));
                Ok(())
            }
            Err(KioskError::Backend(msg)) => {
                log::warn!("Backend rejected patient data: {}", msg);
                self.show_validation(vec![msg.clone()]);
                Err(KioskError::Backend(msg))
            }
            Err(e) => {
                log::error!("Patient capture failed: {}", e);
                self.show_validation(vec![MSG_CONNECTION.to_string()]);
                Err(e)
            }
        }
    }

    /// Send one patient turn. Blank input is ignored.
    pub async fn send_message(&self, text: &str) -> Result<()> {
        self.touch();
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        self.require_screen(Operation::SendMessage, &[Screen::Chat])?;
        let session_id = self.session_id()?;
        let guard = self.begin(Operation::SendMessage)?;

        self.append(ChatMessage::patient(text));
        self.set_typing(true);

        let result = self.backend.send_message(&session_id, text).await;
        if self.is_stale(&guard) {
            return Ok(());
        }
        self.set_typing(false);

        match result {
            Ok(reply) => {
                self.append(ChatMessage::assistant(reply.respuesta.clone()));
                self.speak(&reply.respuesta);
                if reply.diagnostico_listo {
                    self.schedule_diagnosis();
                }
                Ok(())
            }
            Err(e) => {
                log::error!("Message send failed: {}", e);
                self.fail(MSG_SEND_FAILED);
                Err(e)
            }
        }
    }

    /// Fetch the diagnosis and append it to the chat.
    ///
    /// Stays in `Chat` afterwards; never finalizes or prints on its own.
    pub async fn generate_diagnosis(&self) -> Result<()> {
        self.require_screen(Operation::GenerateDiagnosis, &[Screen::Chat])?;
        let session_id = self.session_id()?;
        let guard = self.begin(Operation::GenerateDiagnosis)?;

        self.state.borrow_mut().pending_diagnosis_at = None;
        self.set_screen(Screen::Generando);

        let result = self.backend.generate_diagnosis(&session_id).await;
        if self.is_stale(&guard) {
            return Ok(());
        }

        match result {
            Ok(diagnosis) => {
                let text = render_diagnosis(&diagnosis);
                let summary = spoken_summary(&diagnosis);
                log::info!(
                    "Diagnosis received: {}",
                    diagnosis.diagnostico.as_deref().unwrap_or("(none)")
                );
                self.state.borrow_mut().diagnosis = Some(diagnosis);
                self.set_screen(Screen::Chat);
                self.append(ChatMessage::assistant(text));
                self.event_bus.emit(KioskEvent::DiagnosisReady);
                self.speak(&summary);
                Ok(())
            }
            Err(e) => {
                log::error!("Diagnosis failed: {}", e);
                self.fail(MSG_DIAGNOSIS_FAILED);
                Err(e)
            }
        }
    }

    /// Print the receipt for the current diagnosis. Outcome is reported in-chat.
    pub async fn print_receipt(&self) -> Result<()> {
        self.touch();
        self.require_screen(Operation::PrintReceipt, &[Screen::Chat])?;
        if self.state.borrow().diagnosis.is_none() {
            return Err(KioskError::Other("No hay diagnóstico para imprimir".to_string()));
        }
        let session_id = self.session_id()?;
        let guard = self.begin(Operation::PrintReceipt)?;

        let result = self.backend.print_receipt(&session_id).await;
        if self.is_stale(&guard) {
            return Ok(());
        }

        match result {
            Ok(_) => {
                log::info!("Receipt printed for session {}", session_id);
                self.append(ChatMessage::assistant(MSG_RECEIPT_PRINTED));
                Ok(())
            }
            Err(e) => {
                log::error!("Receipt printing failed: {}", e);
                self.append(ChatMessage::assistant(MSG_RECEIPT_FAILED));
                Err(e)
            }
        }
    }

    /// Close the session and show the farewell, whatever the backend says.
    pub async fn finalize(&self) -> Result<()> {
        self.touch();
        self.require_screen(Operation::Finalize, &[Screen::Datos, Screen::Chat])?;
        let guard = self.begin(Operation::Finalize)?;

        let session_id = {
            let mut st = self.state.borrow_mut();
            st.pending_diagnosis_at = None;
            st.session_id.clone()
        };

        if let Some(id) = session_id {
            let result = self.backend.finalize_session(&id).await;
            if self.is_stale(&guard) {
                return Ok(());
            }
            if let Err(e) = result {
                log::warn!("Finalize failed, continuing to farewell: {}", e);
            }
        }

        self.enter_farewell();
        Ok(())
    }

    /// Clear everything and return to the idle screen. Valid from any state.
    pub fn reset(&self) {
        self.reset_with(ResetReason::Manual);
    }

    /// Record user activity for the inactivity guard.
    pub fn touch(&self) {
        let now = self.now();
        self.state.borrow_mut().last_activity_ms = now;
    }

    // ─── Timers ──────────────────────────────────────────────

    /// Evaluate all deadlines against the clock.
    ///
    /// Inactivity and farewell resets happen here; a due diagnosis is handed
    /// back as `TimerAction::GenerateDiagnosis` exactly once. While another
    /// operation is in flight the diagnosis stays pending for a later poll.
    pub fn poll_timers(&self) -> Vec<TimerAction> {
        let now = self.now();
        let mut actions = Vec::new();

        let (screen, idle_for) = {
            let st = self.state.borrow();
            (st.screen, now.saturating_sub(st.last_activity_ms))
        };
        if screen != Screen::Espera && idle_for >= self.timings.inactivity_ms {
            log::warn!("Inactivity timeout after {}ms on '{}'", idle_for, screen.label());
            self.reset_with(ResetReason::Inactivity);
            actions.push(TimerAction::Reset(ResetReason::Inactivity));
            return actions;
        }

        loop {
            let tick = {
                let mut st = self.state.borrow_mut();
                match st.farewell.as_mut() {
                    Some(f) if now >= f.next_tick_at => {
                        f.remaining = f.remaining.saturating_sub(1);
                        f.next_tick_at += FAREWELL_TICK_MS;
                        Some(f.remaining)
                    }
                    _ => None,
                }
            };
            let Some(remaining) = tick else { break };
            actions.push(TimerAction::FarewellTick { remaining });
            if remaining == 0 {
                self.reset_with(ResetReason::FarewellFinished);
                actions.push(TimerAction::Reset(ResetReason::FarewellFinished));
                return actions;
            }
            self.event_bus.emit(KioskEvent::FarewellTick {
                remaining,
                name: self.farewell_name(),
            });
        }

        let due = {
            let mut st = self.state.borrow_mut();
            match st.pending_diagnosis_at {
                Some(at) if now >= at && st.in_flight.is_none() => {
                    st.pending_diagnosis_at = None;
                    true
                }
                _ => false,
            }
        };
        if due {
            actions.push(TimerAction::GenerateDiagnosis);
        }

        actions
    }

    /// Poll timers and run whatever asynchronous work they made due.
    pub async fn tick(&self) -> Result<()> {
        for action in self.poll_timers() {
            if action == TimerAction::GenerateDiagnosis {
                log::info!("Backend signalled diagnosis ready; generating");
                self.generate_diagnosis().await?;
            }
        }
        Ok(())
    }

    // ─── Peripheral operations ───────────────────────────────

    /// Check backend reachability; an unreachable backend shows the error screen.
    pub async fn check_backend(&self) -> bool {
        let ok = self.backend.health_check().await;
        if !ok {
            log::error!("Backend health check failed");
            self.fail(MSG_BACKEND_DOWN);
        }
        ok
    }

    /// Backend status for the admin settings page. Unlike the health check
    /// this never touches the kiosk screens.
    pub async fn backend_info(&self) -> Result<BackendInfo> {
        let info = self.backend.backend_info().await;
        if let Err(e) = &info {
            log::warn!("Backend info unavailable: {}", e);
        }
        info
    }

    /// Refresh the "consultations today" counter. Failures are only logged.
    pub async fn refresh_statistics(&self) -> Option<u64> {
        match self.backend.statistics().await {
            Ok(stats) => {
                self.event_bus.emit(KioskEvent::StatisticsUpdated {
                    total_consultas: stats.total_consultas,
                });
                Some(stats.total_consultas)
            }
            Err(e) => {
                log::error!("Error fetching statistics: {}", e);
                None
            }
        }
    }

    /// One-shot speech recognition for filling a form field.
    pub async fn dictate(&self) -> Result<String> {
        self.touch();
        if !self.voice.is_available() || !self.voice.is_enabled() {
            return Err(KioskError::Voice("Voz no disponible".to_string()));
        }
        match self.voice.listen().await {
            Ok(text) => {
                self.touch();
                Ok(text.trim().to_string())
            }
            Err(e) => {
                log::warn!("Dictation failed: {}", e);
                Err(e)
            }
        }
    }

    /// Flip voice output on or off. Returns the new setting.
    pub fn toggle_voice(&self) -> bool {
        self.set_voice(!self.voice.is_enabled())
    }

    /// Switch spoken replies on or off; switching off silences the current one.
    pub fn set_voice(&self, enabled: bool) -> bool {
        self.voice.set_enabled(enabled);
        if !enabled {
            self.voice.cancel();
        }
        log::info!("Voice {}", if enabled { "ON" } else { "OFF" });
        enabled
    }

    // ─── Internals ───────────────────────────────────────────

    fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    fn begin(&self, op: Operation) -> Result<FlightGuard> {
        let mut st = self.state.borrow_mut();
        if let Some(current) = st.in_flight {
            log::warn!("Rejected {}: {} still in flight", op.label(), current.label());
            return Err(KioskError::Busy(current.label().to_string()));
        }
        st.in_flight = Some(op);
        Ok(FlightGuard {
            state: self.state.clone(),
            op,
            epoch: st.epoch,
        })
    }

    fn is_stale(&self, guard: &FlightGuard) -> bool {
        let stale = self.state.borrow().epoch != guard.epoch;
        if stale {
            log::info!("Dropping {} reply from a reset session", guard.op.label());
        }
        stale
    }

    fn require_screen(&self, op: Operation, allowed: &[Screen]) -> Result<()> {
        let screen = self.screen();
        if allowed.contains(&screen) {
            Ok(())
        } else {
            Err(KioskError::InvalidState {
                operation: op.label().to_string(),
                screen: screen.label().to_string(),
            })
        }
    }

    fn session_id(&self) -> Result<String> {
        self.state
            .borrow()
            .session_id
            .clone()
            .ok_or(KioskError::NoSession)
    }

    fn set_screen(&self, screen: Screen) {
        self.state.borrow_mut().screen = screen;
        log::info!("Screen: {}", screen.label());
        self.event_bus.emit(KioskEvent::ScreenChanged { screen });
    }

    fn set_typing(&self, active: bool) {
        self.state.borrow_mut().typing = active;
        self.event_bus.emit(KioskEvent::Typing { active });
    }

    fn append(&self, message: ChatMessage) {
        self.state.borrow_mut().messages.push(message.clone());
        self.event_bus.emit(KioskEvent::MessageAppended { message });
    }

    fn show_validation(&self, messages: Vec<String>) {
        self.state.borrow_mut().validation = messages.clone();
        self.event_bus.emit(KioskEvent::Validation { messages });
    }

    fn fail(&self, message: &str) {
        {
            let mut st = self.state.borrow_mut();
            st.error_message = Some(message.to_string());
            st.typing = false;
            st.pending_diagnosis_at = None;
        }
        self.event_bus.emit(KioskEvent::Error {
            message: message.to_string(),
        });
        self.set_screen(Screen::Error);
    }

    fn speak(&self, text: &str) {
        if !self.voice.is_available() || !self.voice.is_enabled() {
            return;
        }
        let clean = self.speech.apply(text);
        if !clean.is_empty() {
            self.voice.speak(&clean);
        }
    }

    fn schedule_diagnosis(&self) {
        let at = self.now() + self.timings.diagnosis_delay_ms;
        let mut st = self.state.borrow_mut();
        if st.pending_diagnosis_at.is_none() {
            st.pending_diagnosis_at = Some(at);
            log::info!("Diagnosis scheduled in {}ms", self.timings.diagnosis_delay_ms);
        }
    }

    fn farewell_name(&self) -> String {
        self.state
            .borrow()
            .patient
            .as_ref()
            .map(|p| p.first_name().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| FAREWELL_FALLBACK_NAME.to_string())
    }

    fn enter_farewell(&self) {
        let ticks = self.timings.farewell_ticks;
        if ticks == 0 {
            self.reset_with(ResetReason::FarewellFinished);
            return;
        }
        let now = self.now();
        self.state.borrow_mut().farewell = Some(Farewell {
            remaining: ticks,
            next_tick_at: now + FAREWELL_TICK_MS,
        });
        let name = self.farewell_name();
        self.set_screen(Screen::Despedida);
        self.event_bus.emit(KioskEvent::FarewellTick {
            remaining: ticks,
            name: name.clone(),
        });
        self.speak(&format!("Gracias por tu consulta, {}. ¡Que te mejores!", name));
    }

    fn reset_with(&self, reason: ResetReason) {
        let now = self.now();
        {
            let mut st = self.state.borrow_mut();
            let epoch = st.epoch + 1;
            *st = SessionState::idle(now);
            st.epoch = epoch;
        }
        self.voice.cancel();
        self.event_bus.emit(KioskEvent::SessionReset);
        self.event_bus.emit(KioskEvent::ScreenChanged {
            screen: Screen::Espera,
        });
        log::info!("Session reset ({:?})", reason);
    }
}
