#[cfg(test)]
mod tests {
    use crate::catalog::*;
    use crate::controller::*;
    use crate::dashboard::Dashboard;
    use crate::envelope::unwrap_envelope;
    use crate::event_bus::EventBus;
    use crate::history::*;
    use crate::learning::*;
    use crate::ports::*;
    use crate::render::{render_diagnosis, spoken_summary};
    use crate::reporting::UsageReport;
    use crate::settings::*;
    use crate::speech::{SpeechPipeline, VoiceInfo, pick_voice};
    use crate::validation::*;
    use kairos_types::api::*;
    use kairos_types::config::KioskConfig;
    use kairos_types::diagnosis::*;
    use kairos_types::event::KioskEvent;
    use kairos_types::history::ConsultationRecord;
    use kairos_types::learning::*;
    use kairos_types::message::Role;
    use kairos_types::product::{Product, ProductDraft, ProductForm};
    use kairos_types::session::Screen;
    use kairos_types::settings::{AiSettings, GeneralSettings};
    use kairos_types::usage::UsageLogEntry;
    use kairos_types::{CatalogError, KioskError};
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveDateTime};
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use serde_json::json;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    // ─── Mock ports ──────────────────────────────────────────

    /// Scripted backend that records every call
    struct MockBackend {
        calls: RefCell<Vec<&'static str>>,
        failures: RefCell<Vec<(&'static str, KioskError)>>,
        reply: RefCell<MessageReply>,
        diagnosis: RefCell<DiagnosisResult>,
        gate: RefCell<Option<oneshot::Receiver<()>>>,
        sessions: Cell<u32>,
        healthy: Cell<bool>,
    }

    impl MockBackend {
        fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                failures: RefCell::new(Vec::new()),
                reply: RefCell::new(MessageReply {
                    respuesta: "Entiendo. ¿Desde cuándo tienes el malestar?".to_string(),
                    diagnostico_listo: false,
                }),
                diagnosis: RefCell::new(sample_diagnosis()),
                gate: RefCell::new(None),
                sessions: Cell::new(0),
                healthy: Cell::new(true),
            }
        }

        fn fail_next(&self, op: &'static str, err: KioskError) {
            self.failures.borrow_mut().push((op, err));
        }

        /// Park the next call until `tx.send(())`
        fn hold(&self, rx: oneshot::Receiver<()>) {
            *self.gate.borrow_mut() = Some(rx);
        }

        fn calls_to(&self, op: &str) -> usize {
            self.calls.borrow().iter().filter(|c| **c == op).count()
        }

        async fn enter(&self, op: &'static str) -> kairos_types::Result<()> {
            self.calls.borrow_mut().push(op);
            let gate = self.gate.borrow_mut().take();
            if let Some(rx) = gate {
                let _ = rx.await;
            }
            let mut failures = self.failures.borrow_mut();
            match failures.iter().position(|(name, _)| *name == op) {
                Some(idx) => Err(failures.remove(idx).1),
                None => Ok(()),
            }
        }
    }

    #[async_trait(?Send)]
    impl BackendPort for MockBackend {
        async fn new_session(&self, _device: &str) -> kairos_types::Result<NewSessionPayload> {
            self.enter("new_session").await?;
            let n = self.sessions.get() + 1;
            self.sessions.set(n);
            Ok(NewSessionPayload {
                sesion_id: format!("sesion-{}", n),
                info: serde_json::Value::Null,
            })
        }

        async fn capture_patient(
            &self,
            _session_id: &str,
            _nombre: &str,
            _dni: &str,
            _edad: Option<u32>,
        ) -> kairos_types::Result<CapturePayload> {
            self.enter("capture_patient").await?;
            Ok(CapturePayload::default())
        }

        async fn send_message(&self, _session_id: &str, _text: &str) -> kairos_types::Result<MessageReply> {
            self.enter("send_message").await?;
            Ok(self.reply.borrow().clone())
        }

        async fn generate_diagnosis(&self, _session_id: &str) -> kairos_types::Result<DiagnosisResult> {
            self.enter("generate_diagnosis").await?;
            Ok(self.diagnosis.borrow().clone())
        }

        async fn print_receipt(&self, _session_id: &str) -> kairos_types::Result<ReceiptPayload> {
            self.enter("print_receipt").await?;
            Ok(ReceiptPayload::default())
        }

        async fn finalize_session(&self, _session_id: &str) -> kairos_types::Result<FinalizePayload> {
            self.enter("finalize_session").await?;
            Ok(FinalizePayload::default())
        }

        async fn statistics(&self) -> kairos_types::Result<Statistics> {
            self.enter("statistics").await?;
            Ok(Statistics { total_consultas: 42 })
        }

        async fn backend_info(&self) -> kairos_types::Result<BackendInfo> {
            self.enter("backend_info").await?;
            Ok(BackendInfo {
                sistema: Some("Kairos".to_string()),
                gpt_activo: true,
                sesiones_activas: 3,
            })
        }

        async fn health_check(&self) -> bool {
            self.calls.borrow_mut().push("health_check");
            self.healthy.get()
        }
    }

    struct MockVoice {
        available: Cell<bool>,
        enabled: Cell<bool>,
        spoken: RefCell<Vec<String>>,
        cancels: Cell<usize>,
        transcript: RefCell<Option<String>>,
    }

    impl MockVoice {
        fn new() -> Self {
            Self {
                available: Cell::new(true),
                enabled: Cell::new(true),
                spoken: RefCell::new(Vec::new()),
                cancels: Cell::new(0),
                transcript: RefCell::new(None),
            }
        }
    }

    #[async_trait(?Send)]
    impl VoicePort for MockVoice {
        fn is_available(&self) -> bool {
            self.available.get()
        }

        fn is_enabled(&self) -> bool {
            self.enabled.get()
        }

        fn set_enabled(&self, enabled: bool) {
            self.enabled.set(enabled);
        }

        fn speak(&self, text: &str) {
            self.spoken.borrow_mut().push(text.to_string());
        }

        fn cancel(&self) {
            self.cancels.set(self.cancels.get() + 1);
        }

        async fn listen(&self) -> kairos_types::Result<String> {
            self.transcript
                .borrow()
                .clone()
                .ok_or_else(|| KioskError::Voice("no-speech".to_string()))
        }
    }

    struct ManualClock {
        now: Cell<u64>,
    }

    impl ManualClock {
        fn at(now: u64) -> Self {
            Self { now: Cell::new(now) }
        }

        fn advance(&self, ms: u64) {
            self.now.set(self.now.get() + ms);
        }
    }

    impl ClockPort for ManualClock {
        fn now_ms(&self) -> u64 {
            self.now.get()
        }
    }

    /// In-memory catalog with a unique code constraint
    struct MemoryCatalog {
        products: RefCell<Vec<Product>>,
        next_id: Cell<u64>,
        /// Inserts to reject as duplicates regardless of content
        collisions: Cell<usize>,
    }

    impl MemoryCatalog {
        fn new() -> Self {
            Self {
                products: RefCell::new(Vec::new()),
                next_id: Cell::new(1),
                collisions: Cell::new(0),
            }
        }

        fn code_taken(&self, code: &str, except: Option<u64>) -> bool {
            self.products
                .borrow()
                .iter()
                .any(|p| p.codigo_producto == code && Some(p.id) != except)
        }
    }

    #[async_trait(?Send)]
    impl CatalogPort for MemoryCatalog {
        async fn list(&self) -> CatalogResult<Vec<Product>> {
            Ok(self.products.borrow().clone())
        }

        async fn get(&self, id: u64) -> CatalogResult<Option<Product>> {
            Ok(self.products.borrow().iter().find(|p| p.id == id).cloned())
        }

        async fn find_by_code(&self, code: &str) -> CatalogResult<Option<Product>> {
            Ok(self.products.borrow().iter().find(|p| p.codigo_producto == code).cloned())
        }

        async fn insert(&self, draft: ProductDraft) -> CatalogResult<Product> {
            if self.collisions.get() > 0 {
                self.collisions.set(self.collisions.get() - 1);
                return Err(CatalogError::DuplicateCode(draft.codigo_producto));
            }
            if self.code_taken(&draft.codigo_producto, None) {
                return Err(CatalogError::DuplicateCode(draft.codigo_producto));
            }
            let id = self.next_id.get();
            self.next_id.set(id + 1);
            let product = draft.into_product(id);
            self.products.borrow_mut().push(product.clone());
            Ok(product)
        }

        async fn update(&self, id: u64, draft: ProductDraft) -> CatalogResult<Product> {
            if self.code_taken(&draft.codigo_producto, Some(id)) {
                return Err(CatalogError::DuplicateCode(draft.codigo_producto));
            }
            let mut products = self.products.borrow_mut();
            let slot = products
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(CatalogError::NotFound(id))?;
            *slot = draft.into_product(id);
            Ok(slot.clone())
        }

        async fn delete(&self, id: u64) -> CatalogResult<()> {
            let mut products = self.products.borrow_mut();
            let before = products.len();
            products.retain(|p| p.id != id);
            if products.len() == before {
                return Err(CatalogError::NotFound(id));
            }
            Ok(())
        }
    }

    // ─── Fixtures ────────────────────────────────────────────

    fn march_15_noon() -> u64 {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis() as u64
    }

    fn sample_diagnosis() -> DiagnosisResult {
        DiagnosisResult {
            diagnostico: Some("Gastritis leve".to_string()),
            confianza: Some(0.85),
            causas: vec!["Estrés".to_string(), "Comidas irregulares".to_string()],
            productos: vec![RecommendedProduct {
                nombre: "Moringa Cápsulas".to_string(),
                dosis: Some("2 cápsulas".to_string()),
                cuando_tomar: Some("antes del desayuno".to_string()),
                duracion: Some("30 días".to_string()),
                ..Default::default()
            }],
            plantas: vec![RecommendedPlant {
                nombre_comun: "Manzanilla".to_string(),
                forma_uso: Some("Infusión".to_string()),
                dosis: Some("1 taza".to_string()),
                ..Default::default()
            }],
            consejos_dieta: vec!["Evitar picantes".to_string()],
            tiempo_mejoria: Some("1-2 semanas".to_string()),
            ..Default::default()
        }
    }

    struct Harness {
        controller: SessionController,
        backend: Rc<MockBackend>,
        voice: Rc<MockVoice>,
        clock: Rc<ManualClock>,
        bus: EventBus,
    }

    fn harness() -> Harness {
        let backend = Rc::new(MockBackend::new());
        let voice = Rc::new(MockVoice::new());
        let clock = Rc::new(ManualClock::at(march_15_noon()));
        let bus = EventBus::new();
        let controller = SessionController::new(
            &KioskConfig::default(),
            backend.clone(),
            voice.clone(),
            clock.clone(),
            bus.clone(),
        );
        Harness { controller, backend, voice, clock, bus }
    }

    async fn to_chat(h: &Harness) {
        h.controller.start().await.unwrap();
        h.controller
            .capture_identity("María López", "12345678", Some(34))
            .await
            .unwrap();
        h.bus.drain();
    }

    // ─── EventBus ────────────────────────────────────────────

    #[test]
    fn test_event_bus_new_is_empty() {
        let bus = EventBus::new();
        assert!(!bus.has_pending());
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn test_event_bus_emit_and_drain() {
        let bus = EventBus::new();
        bus.emit(KioskEvent::DiagnosisReady);
        bus.emit(KioskEvent::Typing { active: true });
        assert!(bus.has_pending());
        assert_eq!(bus.drain().len(), 2);
        assert!(!bus.has_pending());
    }

    #[test]
    fn test_event_bus_clone_shares_state() {
        let bus1 = EventBus::new();
        let bus2 = bus1.clone();
        bus1.emit(KioskEvent::SessionReset);
        assert!(bus2.has_pending());
        assert_eq!(bus2.drain(), vec![KioskEvent::SessionReset]);
        assert!(!bus1.has_pending());
    }

    // ─── Identity validation ─────────────────────────────────

    #[test]
    fn test_validate_identity_accepts_valid_input() {
        assert!(validate_identity("Juan Pérez", "12345678", Some(40)).is_empty());
        assert!(validate_identity("Juan Pérez", "12345678", None).is_empty());
    }

    #[test]
    fn test_validate_identity_itemizes_every_failure() {
        let errors = validate_identity("Ana", "1234", Some(130));
        assert_eq!(errors, vec![ERR_NAME, ERR_DNI, ERR_AGE]);
    }

    #[test]
    fn test_validate_name_counts_characters_not_bytes() {
        // six characters, more than six bytes
        assert!(validate_identity("José Ñ", "12345678", None).is_empty());
        assert_eq!(validate_identity("  Josè ", "12345678", None), vec![ERR_NAME]);
    }

    #[test]
    fn test_dni_must_be_eight_ascii_digits() {
        assert!(is_valid_dni("00000000"));
        assert!(!is_valid_dni("1234567"));
        assert!(!is_valid_dni("123456789"));
        assert!(!is_valid_dni("1234567a"));
        assert!(!is_valid_dni("１２３４５６７８"));
    }

    #[test]
    fn test_age_bounds() {
        assert!(validate_identity("Juan Pérez", "12345678", Some(0)).is_empty());
        assert!(validate_identity("Juan Pérez", "12345678", Some(120)).is_empty());
        assert_eq!(validate_identity("Juan Pérez", "12345678", Some(-1)), vec![ERR_AGE]);
    }

    #[test]
    fn test_parse_age() {
        assert_eq!(parse_age(""), Ok(None));
        assert_eq!(parse_age("  "), Ok(None));
        assert_eq!(parse_age(" 42 "), Ok(Some(42)));
        assert_eq!(parse_age("cuarenta"), Err(ERR_AGE.to_string()));
    }

    // ─── Envelope ────────────────────────────────────────────

    #[test]
    fn test_unwrap_envelope_success() {
        let payload: NewSessionPayload =
            unwrap_envelope(json!({"success": true, "sesion_id": "abc"}), "x").unwrap();
        assert_eq!(payload.sesion_id, "abc");
    }

    #[test]
    fn test_unwrap_envelope_prefers_error_field() {
        let err = unwrap_envelope::<CapturePayload>(
            json!({"success": false, "error": "Sesión no encontrada", "info": {"errores": ["otro"]}}),
            "fallback",
        )
        .unwrap_err();
        assert!(matches!(err, KioskError::Backend(ref m) if m == "Sesión no encontrada"));
    }

    #[test]
    fn test_unwrap_envelope_uses_first_info_error() {
        let err = unwrap_envelope::<CapturePayload>(
            json!({"success": false, "info": {"errores": ["DNI ya registrado hoy", "otro"]}}),
            "fallback",
        )
        .unwrap_err();
        assert!(matches!(err, KioskError::Backend(ref m) if m == "DNI ya registrado hoy"));
    }

    #[test]
    fn test_unwrap_envelope_missing_success_is_failure() {
        let err = unwrap_envelope::<CapturePayload>(json!({"info": {}}), "Error capturando datos").unwrap_err();
        assert!(matches!(err, KioskError::Backend(ref m) if m == "Error capturando datos"));
    }

    // ─── Speech pipeline ─────────────────────────────────────

    #[test]
    fn test_speech_strips_markdown_and_emoji() {
        let speech = SpeechPipeline::spanish();
        assert_eq!(speech.apply("**Hola** 😊 ¿cómo estás? 🌿"), "Hola ¿cómo estás?");
        assert_eq!(speech.apply("# Título\n• uno\n• dos"), "Título uno dos");
    }

    #[test]
    fn test_speech_expands_abbreviations() {
        let speech = SpeechPipeline::spanish();
        assert_eq!(
            speech.apply("La Dra. Ruiz indica 500mg y 10 ml"),
            "La Doctora Ruiz indica 500 miligramos y 10 mililitros"
        );
        assert_eq!(speech.apply("Cuesta S/ 25.50 aprox."), "Cuesta 25.50 soles aproximadamente");
        assert_eq!(speech.apply("Reposa 30 min cada 8 hrs"), "Reposa 30 minutos cada 8 horas");
    }

    #[test]
    fn test_speech_strips_json_and_timestamps() {
        let speech = SpeechPipeline::spanish();
        assert_eq!(speech.apply(r#"Listo {"id": 3, "x": [1, 2]} gracias"#), "Listo gracias");
        assert_eq!(speech.apply("Consulta 2024-03-15T10:30:00Z registrada a las 10:30 ."), "Consulta registrada a las.");
    }

    #[test]
    fn test_speech_custom_pipeline_rejects_bad_pattern() {
        assert!(SpeechPipeline::new(&["("], &[]).is_err());
        let p = SpeechPipeline::new(&["x+"], &[("a", "b")]).unwrap();
        assert_eq!(p.apply("axxa  a"), "b b b");
    }

    fn voice(name: &str, lang: &str, is_default: bool) -> VoiceInfo {
        VoiceInfo { name: name.to_string(), lang: lang.to_string(), is_default }
    }

    #[test]
    fn test_pick_voice_prefers_exact_locale_with_quality() {
        let voices = vec![
            voice("Samantha", "en-US", true),
            voice("Monica", "es-ES", false),
            voice("Google español", "es-ES", false),
            voice("Paulina", "es-MX", false),
        ];
        assert_eq!(pick_voice(&voices, "es-ES"), Some(2));
    }

    #[test]
    fn test_pick_voice_falls_back_to_language_prefix() {
        let voices = vec![
            voice("Samantha", "en-US", true),
            voice("Paulina", "es-MX", false),
            voice("Google español de Estados Unidos", "es_US", false),
        ];
        assert_eq!(pick_voice(&voices, "es-ES"), Some(2));
    }

    #[test]
    fn test_pick_voice_default_then_first() {
        let voices = vec![voice("Alex", "en-US", false), voice("Samantha", "en-US", true)];
        assert_eq!(pick_voice(&voices, "es-ES"), Some(1));
        let voices = vec![voice("Alex", "en-US", false), voice("Fred", "en-US", false)];
        assert_eq!(pick_voice(&voices, "es-ES"), Some(0));
        assert_eq!(pick_voice(&[], "es-ES"), None);
    }

    // ─── Diagnosis rendering ─────────────────────────────────

    #[test]
    fn test_render_diagnosis_sections_in_order() {
        let text = render_diagnosis(&sample_diagnosis());
        assert!(text.starts_with("🩺 Diagnóstico: Gastritis leve (confianza 85%)"));
        assert!(text.contains("\n• Moringa Cápsulas: 2 cápsulas (antes del desayuno), durante 30 días"));
        assert!(text.contains("\n• Manzanilla en infusión: 1 taza"));

        let order = ["🩺", "🔍", "💊", "🌿", "🥗", "⏱️ Tiempo estimado de mejoría: 1-2 semanas"];
        let positions: Vec<usize> = order.iter().map(|m| text.find(m).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "sections out of order: {}", text);
    }

    #[test]
    fn test_render_diagnosis_omits_empty_sections() {
        let text = render_diagnosis(&DiagnosisResult::default());
        assert_eq!(
            text,
            "🩺 Diagnóstico: Sin diagnóstico concluyente\n\n⏱️ Tiempo estimado de mejoría: 2-3 semanas"
        );
    }

    #[test]
    fn test_spoken_summary_names_condition() {
        assert!(spoken_summary(&sample_diagnosis()).contains("Gastritis leve"));
        assert_eq!(spoken_summary(&DiagnosisResult::default()), "Te dejo las recomendaciones en pantalla.");
    }

    // ─── Session controller ──────────────────────────────────

    #[test]
    fn test_controller_starts_idle() {
        let h = harness();
        let state = h.controller.snapshot();
        assert_eq!(state.screen, Screen::Espera);
        assert!(state.session_id.is_none());
        assert!(!h.controller.is_busy());
    }

    #[test]
    fn test_start_moves_to_identity_capture() {
        block_on(async {
            let h = harness();
            h.controller.start().await.unwrap();
            let state = h.controller.snapshot();
            assert_eq!(state.screen, Screen::Datos);
            assert_eq!(state.session_id.as_deref(), Some("sesion-1"));
            let events = h.bus.drain();
            assert!(events.contains(&KioskEvent::SessionStarted { session_id: "sesion-1".to_string() }));
            assert!(events.contains(&KioskEvent::ScreenChanged { screen: Screen::Datos }));
        });
    }

    #[test]
    fn test_start_failure_shows_error_screen() {
        block_on(async {
            let h = harness();
            h.backend.fail_next("new_session", KioskError::Network("offline".to_string()));
            assert!(h.controller.start().await.is_err());
            let state = h.controller.snapshot();
            assert_eq!(state.screen, Screen::Error);
            assert_eq!(state.error_message.as_deref(), Some(MSG_START_FAILED));
            assert!(!h.controller.is_busy());
        });
    }

    #[test]
    fn test_start_rejected_outside_idle() {
        block_on(async {
            let h = harness();
            h.controller.start().await.unwrap();
            let err = h.controller.start().await.unwrap_err();
            assert!(matches!(err, KioskError::InvalidState { .. }));
            assert_eq!(h.backend.calls_to("new_session"), 1);
        });
    }

    #[test]
    fn test_invalid_identity_never_reaches_backend() {
        block_on(async {
            let h = harness();
            h.controller.start().await.unwrap();
            let err = h.controller.capture_identity("Ana", "123", None).await.unwrap_err();
            assert!(matches!(err, KioskError::Validation(ref m) if m.len() == 2));
            assert_eq!(h.backend.calls_to("capture_patient"), 0);
            let state = h.controller.snapshot();
            assert_eq!(state.screen, Screen::Datos);
            assert_eq!(state.validation, vec![ERR_NAME, ERR_DNI]);
        });
    }

    #[test]
    fn test_capture_identity_greets_patient() {
        block_on(async {
            let h = harness();
            h.controller.start().await.unwrap();
            h.bus.drain();
            h.controller
                .capture_identity("  María López ", "12345678", Some(34))
                .await
                .unwrap();

            let state = h.controller.snapshot();
            assert_eq!(state.screen, Screen::Chat);
            let patient = state.patient.unwrap();
            assert_eq!(patient.nombre, "María López");
            assert_eq!(patient.edad, Some(34));
            assert_eq!(state.messages.len(), 1);
            assert_eq!(state.messages[0].role, Role::Assistant);
            assert_eq!(state.messages[0].text, "Hola María! ¿En qué puedo ayudarte hoy?");

            let events = h.bus.drain();
            assert!(events.contains(&KioskEvent::PatientCaptured {
                nombre: "María López".to_string(),
                dni_label: "DNI: 12345678".to_string(),
            }));
        });
    }

    #[test]
    fn test_capture_backend_rejection_is_a_validation_message() {
        block_on(async {
            let h = harness();
            h.controller.start().await.unwrap();
            h.backend.fail_next("capture_patient", KioskError::Backend("DNI no válido".to_string()));
            assert!(h.controller.capture_identity("María López", "12345678", None).await.is_err());
            let state = h.controller.snapshot();
            assert_eq!(state.screen, Screen::Datos);
            assert_eq!(state.validation, vec!["DNI no válido"]);
            assert!(state.patient.is_none());
        });
    }

    #[test]
    fn test_capture_network_error_reports_connection() {
        block_on(async {
            let h = harness();
            h.controller.start().await.unwrap();
            h.backend.fail_next("capture_patient", KioskError::Network("timeout".to_string()));
            assert!(h.controller.capture_identity("María López", "12345678", None).await.is_err());
            let state = h.controller.snapshot();
            assert_eq!(state.screen, Screen::Datos);
            assert_eq!(state.validation, vec![MSG_CONNECTION]);
        });
    }

    #[test]
    fn test_blank_message_is_ignored() {
        block_on(async {
            let h = harness();
            to_chat(&h).await;
            h.controller.send_message("   \n ").await.unwrap();
            assert_eq!(h.backend.calls_to("send_message"), 0);
            assert_eq!(h.controller.snapshot().messages.len(), 1);
            assert!(!h.bus.has_pending());
        });
    }

    #[test]
    fn test_send_message_appends_turns_and_speaks() {
        block_on(async {
            let h = harness();
            to_chat(&h).await;
            h.backend.reply.borrow_mut().respuesta = "**Tranquila** 😊 toma agua".to_string();
            h.controller.send_message(" me duele la cabeza ").await.unwrap();

            let state = h.controller.snapshot();
            let texts: Vec<(Role, &str)> = state.messages.iter().map(|m| (m.role, m.text.as_str())).collect();
            assert_eq!(texts[1], (Role::Patient, "me duele la cabeza"));
            assert_eq!(texts[2], (Role::Assistant, "**Tranquila** 😊 toma agua"));
            assert!(!state.typing);
            assert_eq!(h.voice.spoken.borrow().last().map(String::as_str), Some("Tranquila toma agua"));

            let typing: Vec<bool> = h
                .bus
                .drain()
                .into_iter()
                .filter_map(|e| match e {
                    KioskEvent::Typing { active } => Some(active),
                    _ => None,
                })
                .collect();
            assert_eq!(typing, vec![true, false]);
        });
    }

    #[test]
    fn test_send_failure_shows_error_screen() {
        block_on(async {
            let h = harness();
            to_chat(&h).await;
            h.backend.fail_next("send_message", KioskError::Backend("x".to_string()));
            assert!(h.controller.send_message("hola").await.is_err());
            let state = h.controller.snapshot();
            assert_eq!(state.screen, Screen::Error);
            assert_eq!(state.error_message.as_deref(), Some(MSG_SEND_FAILED));
            assert!(!state.typing);
        });
    }

    #[test]
    fn test_disabled_voice_stays_silent() {
        block_on(async {
            let h = harness();
            to_chat(&h).await;
            assert!(!h.controller.toggle_voice());
            h.controller.send_message("hola").await.unwrap();
            assert!(h.voice.spoken.borrow().is_empty());
            assert!(h.controller.toggle_voice());
        });
    }

    #[test]
    fn test_set_voice_is_idempotent() {
        let h = harness();
        assert!(!h.controller.set_voice(false));
        assert!(!h.controller.set_voice(false));
        assert!(!h.voice.is_enabled());
        assert!(h.controller.set_voice(true));
        assert!(h.voice.is_enabled());
    }

    #[test]
    fn test_clock_local_datetime_shifts_wall_clock() {
        let clock = ManualClock::at(march_15_noon());
        assert_eq!(clock.local_datetime(-300).format("%Y-%m-%d %H:%M").to_string(), "2024-03-15 07:00");
    }

    #[test]
    fn test_ready_signal_schedules_one_diagnosis() {
        block_on(async {
            let h = harness();
            to_chat(&h).await;
            h.backend.reply.borrow_mut().diagnostico_listo = true;
            h.controller.send_message("tengo ardor").await.unwrap();

            h.clock.advance(1_999);
            assert!(h.controller.poll_timers().is_empty());
            h.clock.advance(1);
            assert_eq!(h.controller.poll_timers(), vec![TimerAction::GenerateDiagnosis]);
            assert!(h.controller.poll_timers().is_empty());
        });
    }

    #[test]
    fn test_repeated_ready_signals_do_not_stack() {
        block_on(async {
            let h = harness();
            to_chat(&h).await;
            h.backend.reply.borrow_mut().diagnostico_listo = true;
            h.controller.send_message("uno").await.unwrap();
            h.clock.advance(500);
            h.controller.send_message("dos").await.unwrap();

            h.clock.advance(5_000);
            let due = h
                .controller
                .poll_timers()
                .into_iter()
                .filter(|a| *a == TimerAction::GenerateDiagnosis)
                .count();
            assert_eq!(due, 1);
            assert!(h.controller.poll_timers().is_empty());
        });
    }

    #[test]
    fn test_tick_generates_the_scheduled_diagnosis() {
        block_on(async {
            let h = harness();
            to_chat(&h).await;
            h.backend.reply.borrow_mut().diagnostico_listo = true;
            h.controller.send_message("tengo ardor").await.unwrap();
            h.clock.advance(2_000);
            h.controller.tick().await.unwrap();

            assert_eq!(h.backend.calls_to("generate_diagnosis"), 1);
            let state = h.controller.snapshot();
            assert_eq!(state.screen, Screen::Chat);
            assert_eq!(state.diagnosis, Some(sample_diagnosis()));
            assert!(state.messages.last().unwrap().text.starts_with("🩺 Diagnóstico: Gastritis leve"));
            assert!(h.bus.drain().contains(&KioskEvent::DiagnosisReady));
            assert_eq!(h.backend.calls_to("finalize_session"), 0);
            assert_eq!(h.backend.calls_to("print_receipt"), 0);
        });
    }

    #[test]
    fn test_generate_diagnosis_passes_through_generating_screen() {
        block_on(async {
            let h = harness();
            to_chat(&h).await;
            h.controller.generate_diagnosis().await.unwrap();
            let screens: Vec<Screen> = h
                .bus
                .drain()
                .into_iter()
                .filter_map(|e| match e {
                    KioskEvent::ScreenChanged { screen } => Some(screen),
                    _ => None,
                })
                .collect();
            assert_eq!(screens, vec![Screen::Generando, Screen::Chat]);
        });
    }

    #[test]
    fn test_diagnosis_failure_shows_error_screen() {
        block_on(async {
            let h = harness();
            to_chat(&h).await;
            h.backend.fail_next("generate_diagnosis", KioskError::Network("down".to_string()));
            assert!(h.controller.generate_diagnosis().await.is_err());
            assert_eq!(h.controller.screen(), Screen::Error);
            assert_eq!(h.controller.snapshot().error_message.as_deref(), Some(MSG_DIAGNOSIS_FAILED));
        });
    }

    #[test]
    fn test_second_operation_while_in_flight_is_busy() {
        block_on(async {
            let h = harness();
            to_chat(&h).await;
            let (tx, rx) = oneshot::channel();
            h.backend.hold(rx);

            let mut first = Box::pin(h.controller.send_message("me duele"));
            assert!(futures::poll!(first.as_mut()).is_pending());
            assert!(h.controller.is_busy());

            let second = h.controller.send_message("otra cosa").await;
            assert!(matches!(second, Err(KioskError::Busy(_))));
            let finalize = h.controller.finalize().await;
            assert!(matches!(finalize, Err(KioskError::Busy(_))));
            assert_eq!(h.controller.snapshot().messages.len(), 2);

            tx.send(()).unwrap();
            first.await.unwrap();
            assert!(!h.controller.is_busy());
            assert_eq!(h.backend.calls_to("send_message"), 1);
            assert_eq!(h.backend.calls_to("finalize_session"), 0);
        });
    }

    #[test]
    fn test_finalize_rejected_while_generating() {
        block_on(async {
            let h = harness();
            to_chat(&h).await;
            let (tx, rx) = oneshot::channel();
            h.backend.hold(rx);

            let mut diagnosis = Box::pin(h.controller.generate_diagnosis());
            assert!(futures::poll!(diagnosis.as_mut()).is_pending());
            assert!(h.controller.finalize().await.is_err());

            tx.send(()).unwrap();
            diagnosis.await.unwrap();
            assert_eq!(h.controller.screen(), Screen::Chat);
            assert_eq!(h.backend.calls_to("finalize_session"), 0);
        });
    }

    #[test]
    fn test_pending_diagnosis_waits_for_in_flight_operation() {
        block_on(async {
            let h = harness();
            to_chat(&h).await;
            h.backend.reply.borrow_mut().diagnostico_listo = true;
            h.controller.send_message("uno").await.unwrap();
            h.backend.reply.borrow_mut().diagnostico_listo = false;

            let (tx, rx) = oneshot::channel();
            h.backend.hold(rx);
            let mut second = Box::pin(h.controller.send_message("dos"));
            assert!(futures::poll!(second.as_mut()).is_pending());

            h.clock.advance(2_000);
            assert!(h.controller.poll_timers().is_empty());

            tx.send(()).unwrap();
            second.await.unwrap();
            assert_eq!(h.controller.poll_timers(), vec![TimerAction::GenerateDiagnosis]);
        });
    }

    #[test]
    fn test_finalize_cancels_pending_diagnosis() {
        block_on(async {
            let h = harness();
            to_chat(&h).await;
            h.backend.reply.borrow_mut().diagnostico_listo = true;
            h.controller.send_message("tengo ardor").await.unwrap();
            h.controller.finalize().await.unwrap();
            assert_eq!(h.controller.screen(), Screen::Despedida);

            h.clock.advance(2_000);
            let actions = h.controller.poll_timers();
            assert!(!actions.contains(&TimerAction::GenerateDiagnosis));
            assert_eq!(h.backend.calls_to("generate_diagnosis"), 0);
        });
    }

    #[test]
    fn test_finalize_reaches_farewell_even_if_backend_fails() {
        block_on(async {
            let h = harness();
            to_chat(&h).await;
            h.backend.fail_next("finalize_session", KioskError::Network("down".to_string()));
            h.controller.finalize().await.unwrap();
            assert_eq!(h.controller.screen(), Screen::Despedida);
            assert!(h.bus.drain().contains(&KioskEvent::FarewellTick {
                remaining: 5,
                name: "María".to_string(),
            }));
        });
    }

    #[test]
    fn test_farewell_counts_down_then_resets() {
        block_on(async {
            let h = harness();
            to_chat(&h).await;
            h.controller.finalize().await.unwrap();

            for expected in (1..5).rev() {
                h.clock.advance(FAREWELL_TICK_MS);
                assert_eq!(h.controller.poll_timers(), vec![TimerAction::FarewellTick { remaining: expected }]);
                assert_eq!(h.controller.screen(), Screen::Despedida);
            }
            h.clock.advance(FAREWELL_TICK_MS);
            assert_eq!(
                h.controller.poll_timers(),
                vec![
                    TimerAction::FarewellTick { remaining: 0 },
                    TimerAction::Reset(ResetReason::FarewellFinished),
                ]
            );
            assert_eq!(h.controller.screen(), Screen::Espera);
        });
    }

    #[test]
    fn test_farewell_without_patient_uses_fallback_name() {
        block_on(async {
            let h = harness();
            h.controller.start().await.unwrap();
            h.controller.finalize().await.unwrap();
            assert!(h.bus.drain().contains(&KioskEvent::FarewellTick {
                remaining: 5,
                name: FAREWELL_FALLBACK_NAME.to_string(),
            }));
        });
    }

    #[test]
    fn test_reset_clears_session() {
        block_on(async {
            let h = harness();
            to_chat(&h).await;
            h.controller.send_message("hola").await.unwrap();
            let epoch = h.controller.snapshot().epoch;

            h.controller.reset();
            let state = h.controller.snapshot();
            assert_eq!(state.screen, Screen::Espera);
            assert!(state.session_id.is_none());
            assert!(state.patient.is_none());
            assert!(state.messages.is_empty());
            assert!(state.diagnosis.is_none());
            assert!(state.pending_diagnosis_at.is_none());
            assert_eq!(state.epoch, epoch + 1);
            assert!(h.voice.cancels.get() > 0);
            assert!(h.bus.drain().contains(&KioskEvent::SessionReset));
        });
    }

    #[test]
    fn test_reset_leaves_error_screen() {
        block_on(async {
            let h = harness();
            h.backend.healthy.set(false);
            assert!(!h.controller.check_backend().await);
            assert_eq!(h.controller.screen(), Screen::Error);
            assert_eq!(h.controller.snapshot().error_message.as_deref(), Some(MSG_BACKEND_DOWN));
            h.controller.reset();
            assert_eq!(h.controller.screen(), Screen::Espera);
            assert!(h.controller.snapshot().error_message.is_none());
        });
    }

    #[test]
    fn test_late_reply_after_reset_is_dropped() {
        block_on(async {
            let h = harness();
            let (tx, rx) = oneshot::channel();
            h.backend.hold(rx);

            let mut stale = Box::pin(h.controller.start());
            assert!(futures::poll!(stale.as_mut()).is_pending());

            h.controller.reset();
            h.controller.start().await.unwrap();
            assert_eq!(h.controller.snapshot().session_id.as_deref(), Some("sesion-1"));

            tx.send(()).unwrap();
            stale.await.unwrap();
            let state = h.controller.snapshot();
            assert_eq!(state.session_id.as_deref(), Some("sesion-1"));
            assert_eq!(state.screen, Screen::Datos);
            assert!(state.in_flight.is_none());
        });
    }

    #[test]
    fn test_inactivity_resets_session() {
        block_on(async {
            let h = harness();
            to_chat(&h).await;
            h.clock.advance(299_999);
            assert!(h.controller.poll_timers().is_empty());
            h.clock.advance(1);
            assert_eq!(h.controller.poll_timers(), vec![TimerAction::Reset(ResetReason::Inactivity)]);
            assert_eq!(h.controller.screen(), Screen::Espera);
        });
    }

    #[test]
    fn test_touch_postpones_inactivity() {
        block_on(async {
            let h = harness();
            to_chat(&h).await;
            h.clock.advance(200_000);
            h.controller.touch();
            h.clock.advance(200_000);
            assert!(h.controller.poll_timers().is_empty());
            assert_eq!(h.controller.screen(), Screen::Chat);
        });
    }

    #[test]
    fn test_idle_screen_never_times_out() {
        let h = harness();
        h.clock.advance(10 * 300_000);
        assert!(h.controller.poll_timers().is_empty());
        assert!(!h.bus.has_pending());
    }

    #[test]
    fn test_print_receipt_requires_diagnosis() {
        block_on(async {
            let h = harness();
            to_chat(&h).await;
            assert!(h.controller.print_receipt().await.is_err());
            assert_eq!(h.backend.calls_to("print_receipt"), 0);
        });
    }

    #[test]
    fn test_print_receipt_reports_in_chat() {
        block_on(async {
            let h = harness();
            to_chat(&h).await;
            h.controller.generate_diagnosis().await.unwrap();
            h.controller.print_receipt().await.unwrap();
            assert_eq!(h.controller.snapshot().messages.last().unwrap().text, MSG_RECEIPT_PRINTED);

            h.backend.fail_next("print_receipt", KioskError::Backend("sin papel".to_string()));
            assert!(h.controller.print_receipt().await.is_err());
            let state = h.controller.snapshot();
            assert_eq!(state.screen, Screen::Chat);
            assert_eq!(state.messages.last().unwrap().text, MSG_RECEIPT_FAILED);
        });
    }

    #[test]
    fn test_refresh_statistics_emits_counter() {
        block_on(async {
            let h = harness();
            assert_eq!(h.controller.refresh_statistics().await, Some(42));
            assert_eq!(h.bus.drain(), vec![KioskEvent::StatisticsUpdated { total_consultas: 42 }]);

            h.backend.fail_next("statistics", KioskError::Network("down".to_string()));
            assert_eq!(h.controller.refresh_statistics().await, None);
            assert_eq!(h.controller.screen(), Screen::Espera);
        });
    }

    #[test]
    fn test_dictate() {
        block_on(async {
            let h = harness();
            *h.voice.transcript.borrow_mut() = Some(" María López ".to_string());
            assert_eq!(h.controller.dictate().await.unwrap(), "María López");

            h.voice.available.set(false);
            assert!(matches!(h.controller.dictate().await, Err(KioskError::Voice(_))));
        });
    }

    // ─── Catalog ─────────────────────────────────────────────

    fn catalog() -> (CatalogService, Rc<MemoryCatalog>) {
        let store = Rc::new(MemoryCatalog::new());
        let clock = Rc::new(ManualClock::at(march_15_noon()));
        (CatalogService::new(store.clone(), clock), store)
    }

    fn form(nombre: &str, categoria: &str, precio: &str) -> ProductForm {
        ProductForm {
            nombre: nombre.to_string(),
            categoria: categoria.to_string(),
            precio: precio.to_string(),
            activo: true,
            ..Default::default()
        }
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_create_product_requires_fields() {
        block_on(async {
            let (svc, _) = catalog();
            let err = svc.create_product(&form(" ", "", "abc")).await.unwrap_err();
            assert_eq!(
                err,
                CatalogError::Invalid(vec![
                    ERR_NAME_REQUIRED.to_string(),
                    ERR_CATEGORY_REQUIRED.to_string(),
                    ERR_PRICE.to_string(),
                ])
            );
        });
    }

    #[test]
    fn test_create_product_generates_code() {
        block_on(async {
            let (svc, _) = catalog();
            let mut f = form("Moringa Cápsulas", "moringa_capsulas", "35,50");
            f.descripcion_corta = "  ".to_string();
            let p = svc.create_product(&f).await.unwrap();
            assert!(p.codigo_producto.starts_with("MOR-240315-"), "{}", p.codigo_producto);
            let suffix: u16 = p.codigo_producto.rsplit('-').next().unwrap().parse().unwrap();
            assert!((100..=999).contains(&suffix));
            assert_eq!(p.precio, 35.5);
            assert_eq!(p.descripcion_corta, None);
        });
    }

    #[test]
    fn test_generate_code_format() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
        assert_eq!(generate_code("ganoderma_te", date, 123), "GAN-250107-123");
        assert_eq!(generate_code(" Moringa ", date, 999), "MOR-250107-999");
    }

    #[test]
    fn test_generate_code_short_or_accented_category_uses_fallback() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
        assert_eq!(generate_code("té", date, 500), "OTR-250107-500");
        assert_eq!(generate_code("ñam", date, 501), "OTR-250107-501");
        assert_eq!(generate_code("  ", date, 502), "OTR-250107-502");
    }

    #[test]
    fn test_generated_code_uses_lima_date_in_the_evening() {
        block_on(async {
            // 2024-03-15 21:30 in Lima is already 2024-03-16 02:30 UTC
            let evening = NaiveDate::from_ymd_opt(2024, 3, 16)
                .unwrap()
                .and_hms_opt(2, 30, 0)
                .unwrap()
                .and_utc()
                .timestamp_millis() as u64;
            let store = Rc::new(MemoryCatalog::new());
            let svc = CatalogService::new(store.clone(), Rc::new(ManualClock::at(evening)));
            let p = svc.create_product(&form("Moringa Polvo", "moringa_polvo", "20")).await.unwrap();
            assert!(p.codigo_producto.starts_with("MOR-240315-"), "{}", p.codigo_producto);

            let utc = CatalogService::new(store, Rc::new(ManualClock::at(evening))).with_utc_offset(0);
            let p = utc.create_product(&form("Moringa Té", "moringa_te", "20")).await.unwrap();
            assert!(p.codigo_producto.starts_with("MOR-240316-"), "{}", p.codigo_producto);
        });
    }

    #[test]
    fn test_clock_local_date_applies_offset() {
        let clock = ManualClock::at(march_15_noon());
        assert_eq!(clock.local_date(0), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(clock.local_date(-13 * 60), NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
        assert_eq!(clock.local_date(12 * 60), NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
    }

    #[test]
    fn test_create_retries_generated_code_collisions() {
        block_on(async {
            let (svc, store) = catalog();
            store.collisions.set(2);
            assert!(svc.create_product(&form("Té Verde", "otros", "10")).await.is_ok());

            store.collisions.set(3);
            let err = svc.create_product(&form("Té Rojo", "otros", "10")).await.unwrap_err();
            assert_eq!(friendly_messages(&err), vec![ERR_DUPLICATE_STORED]);
        });
    }

    #[test]
    fn test_create_rejects_duplicate_code() {
        block_on(async {
            let (svc, _) = catalog();
            let mut f = form("Moringa Polvo", "moringa_polvo", "20");
            f.codigo_producto = "MOR-001".to_string();
            svc.create_product(&f).await.unwrap();

            f.nombre = "Otra".to_string();
            let err = svc.create_product(&f).await.unwrap_err();
            assert_eq!(err, CatalogError::DuplicateCode("MOR-001".to_string()));
            assert_eq!(
                friendly_messages(&err),
                vec!["El código \"MOR-001\" ya existe. Usa otro código o déjalo vacío para generar uno automático."]
            );
        });
    }

    #[test]
    fn test_update_product() {
        block_on(async {
            let (svc, _) = catalog();
            let mut a = form("Aceite de Moringa", "moringa_aceite", "40");
            a.codigo_producto = "ACE-1".to_string();
            let a = svc.create_product(&a).await.unwrap();
            let mut b = form("Combo Salud", "combos", "90");
            b.codigo_producto = "COM-1".to_string();
            let b = svc.create_product(&b).await.unwrap();

            let updated = svc.update_product(a.id, &form("Aceite Puro", "", "45")).await.unwrap();
            assert_eq!(updated.codigo_producto, "ACE-1");
            assert_eq!(updated.categoria, "moringa_aceite");
            assert_eq!(updated.nombre, "Aceite Puro");

            let mut steal = form("Aceite Puro", "", "45");
            steal.codigo_producto = b.codigo_producto.clone();
            assert_eq!(
                svc.update_product(a.id, &steal).await.unwrap_err(),
                CatalogError::DuplicateCode("COM-1".to_string())
            );

            assert_eq!(
                svc.update_product(99, &form("X", "", "1")).await.unwrap_err(),
                CatalogError::NotFound(99)
            );
        });
    }

    #[test]
    fn test_delete_product() {
        block_on(async {
            let (svc, _) = catalog();
            let p = svc.create_product(&form("Té Verde", "otros", "10")).await.unwrap();
            assert_eq!(
                svc.delete_product(0).await.unwrap_err(),
                CatalogError::Invalid(vec![ERR_INVALID_ID.to_string()])
            );
            assert_eq!(svc.delete_product(77).await.unwrap_err(), CatalogError::NotFound(77));
            svc.delete_product(p.id).await.unwrap();
            assert!(svc.list_products().await.unwrap().is_empty());
        });
    }

    #[test]
    fn test_list_sorted_by_name_and_count_active() {
        block_on(async {
            let (svc, _) = catalog();
            svc.create_product(&form("moringa", "otros", "1")).await.unwrap();
            let mut inactive = form("Aceite", "otros", "1");
            inactive.activo = false;
            svc.create_product(&inactive).await.unwrap();
            svc.create_product(&form("Combo", "otros", "1")).await.unwrap();

            let names: Vec<String> = svc.list_products().await.unwrap().into_iter().map(|p| p.nombre).collect();
            assert_eq!(names, vec!["Aceite", "Combo", "moringa"]);
            assert_eq!(svc.count_active().await.unwrap(), 2);
        });
    }

    #[test]
    fn test_export_rows_layout() {
        block_on(async {
            let (svc, _) = catalog();
            let mut f = form("Té Verde", "otros", "12.5");
            f.codigo_producto = "OTR-1".to_string();
            f.activo = false;
            svc.create_product(&f).await.unwrap();

            let rows = svc.export_rows().await.unwrap();
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].len(), EXPORT_HEADERS.len());
            assert_eq!(rows[0][1], "Té Verde");
            assert_eq!(rows[0][3], "OTR-1");
            assert_eq!(rows[0][9], "12.50");
            assert_eq!(rows[0][11], "No");

            let tsv = to_tsv(&rows);
            assert!(tsv.starts_with("ID\tNombre\tCategoría"));
            assert_eq!(parse_tsv(&tsv), rows);
        });
    }

    #[test]
    fn test_import_rows_upserts_and_reports_per_row() {
        block_on(async {
            let (svc, _) = catalog();
            let mut existing = form("Ganoderma", "ganoderma_te", "20");
            existing.codigo_producto = "GAN-1".to_string();
            let existing = svc.create_product(&existing).await.unwrap();
            let id = existing.id.to_string();

            let rows = vec![
                row(&["", "Moringa Cápsulas", "moringa_capsulas", "MOR-001", "", "", "", "", "", "35.50", "", "Sí"]),
                row(&[id.as_str(), "Ganoderma Té", "ganoderma_te", "", "", "", "", "", "", "22", "", "No"]),
                row(&["", "", "otros"]),
                row(&["", "Aceite", "moringa_aceite", "", "", "", "", "", "", "caro", "", ""]),
                row(&["", "Duplicado", "otros", "MOR-001", "", "", "", "", "", "10", "", ""]),
                row(&["", "Sin código"]),
            ];
            let summary = svc.import_rows(&rows).await;

            assert_eq!(summary.imported, 2);
            assert_eq!(summary.updated, 1);
            assert_eq!(summary.skipped, 1);
            assert_eq!(summary.errors.len(), 2);
            assert!(summary.errors[0].starts_with("Fila 5: "));
            assert!(summary.errors[1].starts_with("Fila 6: El código \"MOR-001\""));

            let updated = svc.get_product(existing.id).await.unwrap();
            assert_eq!(updated.nombre, "Ganoderma Té");
            assert_eq!(updated.codigo_producto, "GAN-1");
            assert!(!updated.activo);

            let products = svc.list_products().await.unwrap();
            let generated = products.iter().find(|p| p.nombre == "Sin código").unwrap();
            assert_eq!(generated.categoria, "otros");
            assert!(generated.codigo_producto.starts_with("OTR-240315-"));
            assert_eq!(generated.precio, 0.0);
        });
    }

    #[test]
    fn test_friendly_messages_hide_store_details() {
        assert_eq!(
            friendly_messages(&CatalogError::Store("disk I/O error".to_string())),
            vec![ERR_STORE]
        );
        assert_eq!(friendly_messages(&CatalogError::NotFound(3)), vec![ERR_NOT_FOUND]);
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("12,50"), Some(12.5));
        assert_eq!(parse_price(" 7 "), Some(7.0));
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("NaN"), None);
    }

    // ─── Usage reporting ─────────────────────────────────────

    fn usage(ts: &str, modelo: &str, tokens: u64, cost: f64, ms: u64, ok: bool) -> UsageLogEntry {
        UsageLogEntry {
            fecha_consulta: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
            sintoma: None,
            modelo: modelo.to_string(),
            tokens_usados: tokens,
            costo_estimado: cost,
            tiempo_respuesta_ms: ms,
            exitosa: ok,
        }
    }

    #[test]
    fn test_usage_report_aggregates() {
        let entries = vec![
            usage("2024-03-15 09:00:00", "gpt-4o-mini", 100, 0.01, 800, true),
            usage("2024-03-02 08:00:00", "gpt-4o", 500, 0.10, 2000, false),
            usage("2024-03-15 10:00:00", "gpt-4o-mini", 300, 0.03, 1200, true),
            usage("2024-02-28 08:00:00", "gpt-4o", 1000, 0.20, 3000, true),
        ];
        let report = UsageReport::build(&entries, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());

        assert_eq!(report.today.calls, 2);
        assert_eq!(report.today.tokens, 400);
        assert!((report.today.cost - 0.04).abs() < 1e-9);
        assert!((report.today.avg_latency_ms - 1000.0).abs() < 1e-9);

        assert_eq!(report.month.calls, 3);
        assert_eq!(report.month.tokens, 900);

        let models: Vec<(&str, usize)> = report.by_model.iter().map(|m| (m.modelo.as_str(), m.calls)).collect();
        assert_eq!(models, vec![("gpt-4o-mini", 2), ("gpt-4o", 1)]);

        assert!((report.success_rate.unwrap() - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(report.recent.len(), 4);
        assert_eq!(report.recent[0].fecha_consulta.to_string(), "2024-03-15 10:00:00");
    }

    #[test]
    fn test_usage_report_empty_and_recent_limit() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let empty = UsageReport::build(&[], today);
        assert_eq!(empty.today.calls, 0);
        assert_eq!(empty.today.avg_latency_ms, 0.0);
        assert_eq!(empty.success_rate, None);

        let entries: Vec<UsageLogEntry> = (0..25)
            .map(|i| usage(&format!("2024-03-10 10:{:02}:00", i), "gpt-4o-mini", 1, 0.0, 1, true))
            .collect();
        let report = UsageReport::build(&entries, today);
        assert_eq!(report.recent.len(), 20);
        assert_eq!(report.recent[0].fecha_consulta.to_string(), "2024-03-10 10:24:00");
    }

    // ─── Backend status ──────────────────────────────────────

    #[test]
    fn test_backend_info_leaves_kiosk_screen_alone() {
        block_on(async {
            let h = harness();
            let info = h.controller.backend_info().await.unwrap();
            assert!(info.gpt_activo);
            assert_eq!(info.sesiones_activas, 3);

            h.backend.fail_next("backend_info", KioskError::Network("down".to_string()));
            assert!(matches!(h.controller.backend_info().await, Err(KioskError::Network(_))));
            assert_eq!(h.controller.screen(), Screen::Espera);
            assert!(!h.bus.has_pending());
        });
    }

    // ─── Consultation history ────────────────────────────────

    fn consultation(id: u64, ts: &str, paciente: Option<&str>, dni: Option<&str>, sintoma: &str) -> ConsultationRecord {
        ConsultationRecord {
            id,
            fecha: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
            sintoma_principal: sintoma.to_string(),
            sintomas_adicionales: None,
            notas: None,
            paciente: paciente.map(str::to_string),
            dni: dni.map(str::to_string),
            edad: Some(40),
            telefono: None,
            condicion_detectada: None,
            confianza: None,
            causas_probables: None,
            recomendaciones_generales: None,
            alimentacion_recomendada: None,
            habitos_sugeridos: None,
            evento: None,
            ubicacion: None,
            dispositivo: None,
            duracion_minutos: None,
            productos: vec![],
        }
    }

    fn history_fixture() -> Vec<ConsultationRecord> {
        let mut a = consultation(1, "2024-03-01 09:00:00", Some("Juan Perez"), Some("12345678"), "Dolor de cabeza");
        a.confianza = Some(0.9);
        let mut b = consultation(2, "2024-03-10 17:30:00", Some("María López"), Some("87654321"), "insomnio");
        b.confianza = Some(0.6);
        let c = consultation(3, "2024-03-15 08:00:00", Some("Juan Perez"), Some("12345678"), "cansancio");
        let old = consultation(4, "2024-01-20 10:00:00", Some("Ana Ruiz"), Some("11112222"), "dolor de espalda");
        let anonymous = consultation(5, "2024-03-12 12:00:00", None, None, "Dolor de estómago");
        vec![a, b, c, old, anonymous]
    }

    #[test]
    fn test_history_filter_range_and_stats() {
        let filter = HistoryFilter::recent(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(filter.desde, NaiveDate::from_ymd_opt(2024, 2, 14).unwrap());

        let view = HistoryView::build(&history_fixture(), &filter);
        let ids: Vec<u64> = view.rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 5, 2, 1]);
        assert_eq!(view.stats.total, 4);
        assert_eq!(view.stats.pacientes_unicos, 2);
        assert!((view.stats.confianza_promedio.unwrap() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_history_search_is_case_insensitive_and_keeps_range_stats() {
        let filter = HistoryFilter::parse("2024-03-01", "2024-03-15", "  DOLOR ").unwrap();
        let view = HistoryView::build(&history_fixture(), &filter);
        let ids: Vec<u64> = view.rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![5, 1]);
        assert_eq!(view.stats.total, 4);

        let by_dni = HistoryFilter::parse("2024-01-01", "2024-03-31", "8765").unwrap();
        let view = HistoryView::build(&history_fixture(), &by_dni);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].patient_label(), "María López");
    }

    #[test]
    fn test_history_filter_rejects_bad_dates() {
        assert_eq!(
            HistoryFilter::parse("15/03/2024", "2024-03-15", "").unwrap_err(),
            vec![ERR_DATE_FORMAT]
        );
        assert_eq!(
            HistoryFilter::parse("2024-03-16", "2024-03-15", "").unwrap_err(),
            vec![ERR_DATE_ORDER]
        );
    }

    #[test]
    fn test_history_limit_and_empty_confidence() {
        let records: Vec<ConsultationRecord> = (0..130)
            .map(|i| consultation(i, "2024-03-15 10:00:00", None, None, "x"))
            .collect();
        let filter = HistoryFilter::parse("2024-03-15", "2024-03-15", "").unwrap();
        let view = HistoryView::build(&records, &filter);
        assert_eq!(view.rows.len(), HISTORY_LIMIT);
        assert_eq!(view.rows[0].id, 129);
        assert_eq!(view.stats.total, 130);
        assert_eq!(view.stats.pacientes_unicos, 0);
        assert_eq!(view.stats.confianza_promedio, None);
    }

    // ─── Learning ────────────────────────────────────────────

    fn pattern(id: u64, intent: &str, seen: u64, confianza: f64) -> LearnedPattern {
        LearnedPattern {
            id,
            intencion_detectada: intent.to_string(),
            texto_ejemplo: format!("ejemplo {}", id),
            veces_visto: seen,
            confianza,
            ultima_vez_visto: None,
            origen: Some("gpt".to_string()),
            created_at: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(0, 0, id as u32 % 60),
        }
    }

    #[test]
    fn test_pattern_page_orders_filters_and_paginates() {
        let mut patrones: Vec<LearnedPattern> = (1..=45).map(|i| pattern(i, "dolor_cabeza", i % 5, 0.5)).collect();
        patrones.push(pattern(100, "insomnio", 50, 1.0));
        let export = LearningExport {
            patrones,
            ..Default::default()
        };

        let first = PatternPage::build(&export, None, 1);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.rows.len(), PATTERNS_PER_PAGE);
        assert_eq!(first.rows[0].id, 100);
        // same count: newer pattern first
        assert_eq!(first.rows[1].id, 44);
        assert_eq!(first.intenciones, vec!["dolor_cabeza", "insomnio"]);
        assert_eq!(first.stats.total_patrones, 46);
        assert_eq!(first.stats.total_veces, 50 + (1..=45u64).map(|i| i % 5).sum::<u64>());

        let last = PatternPage::build(&export, None, 99);
        assert_eq!(last.page, 3);
        assert_eq!(last.rows.len(), 6);

        let insomnio = PatternPage::build(&export, Some("insomnio"), 1);
        assert_eq!(insomnio.matching, 1);
        assert_eq!(insomnio.total_pages, 1);
        assert_eq!(insomnio.stats.total_patrones, 46);
    }

    #[test]
    fn test_pattern_page_empty_export() {
        let page = PatternPage::build(&LearningExport::default(), Some(""), 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.rows.is_empty());
        assert_eq!(page.stats.confianza_promedio, None);
    }

    #[test]
    fn test_training_runs_newest_first_and_limited() {
        let entrenamientos = (1..=12)
            .map(|d| TrainingRun {
                fecha: NaiveDate::from_ymd_opt(2024, 3, d).unwrap().and_hms_opt(3, 0, 0).unwrap(),
                tipo_entrenamiento: "incremental".to_string(),
                num_muestras: 10 * d as u64,
                precision_alcanzada: 0.9,
                duracion_segundos: 4,
            })
            .collect();
        let export = LearningExport {
            entrenamientos,
            ..Default::default()
        };
        let page = PatternPage::build(&export, None, 1);
        assert_eq!(page.entrenamientos.len(), TRAINING_LIMIT);
        assert_eq!(page.entrenamientos[0].num_muestras, 120);
    }

    #[test]
    fn test_confidence_bands() {
        assert_eq!(ConfidenceBand::of(0.8), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::of(0.79), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::of(0.6), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::of(0.2), ConfidenceBand::Low);
    }

    #[test]
    fn test_knowledge_view_totals() {
        let entry = |id: u64, uses: u64, cost: f64| CachedKnowledge {
            id,
            sintoma_consulta: format!("síntoma {}", id),
            respuesta_gpt: "Beber agua".to_string(),
            veces_usado: uses,
            costo_tokens: cost,
            created_at: NaiveDate::from_ymd_opt(2024, 3, id as u32).unwrap().and_hms_opt(9, 0, 0),
        };
        let view = KnowledgeView::build(&[entry(1, 3, 0.002), entry(2, 7, 0.004)]);
        assert_eq!(view.total, 2);
        assert_eq!(view.total_usos, 10);
        assert!((view.costo_promedio.unwrap() - 0.003).abs() < 1e-12);
        assert_eq!(view.rows[0].id, 2);
        assert_eq!(KnowledgeView::build(&[]).costo_promedio, None);
    }

    // ─── Dashboard ───────────────────────────────────────────

    #[test]
    fn test_dashboard_counts_and_week() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let dash = Dashboard::build(&history_fixture(), 46, 12, today);

        assert_eq!(dash.total_consultas, 5);
        assert_eq!(dash.consultas_hoy, 1);
        assert_eq!(dash.total_patrones, 46);
        assert_eq!(dash.productos_activos, 12);

        assert_eq!(dash.semana.len(), 7);
        assert_eq!(dash.semana[0].0, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(dash.semana[6], (today, 1));
        let counts: Vec<usize> = dash.semana.iter().map(|(_, n)| *n).collect();
        assert_eq!(counts, vec![0, 1, 0, 1, 0, 0, 1]);
        assert_eq!(dash.week_peak(), 1);

        let ids: Vec<u64> = dash.recientes.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 5, 2, 1, 4]);
    }

    #[test]
    fn test_dashboard_empty() {
        let dash = Dashboard::build(&[], 0, 0, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(dash.week_peak(), 1);
        assert!(dash.recientes.is_empty());
    }

    // ─── Settings ────────────────────────────────────────────

    /// HashMap-backed storage
    struct MapStorage {
        values: RefCell<std::collections::HashMap<String, Vec<u8>>>,
    }

    impl MapStorage {
        fn new() -> Self {
            Self {
                values: RefCell::new(std::collections::HashMap::new()),
            }
        }
    }

    #[async_trait(?Send)]
    impl StoragePort for MapStorage {
        async fn get(&self, key: &str) -> kairos_types::Result<Option<Vec<u8>>> {
            Ok(self.values.borrow().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &[u8]) -> kairos_types::Result<()> {
            self.values.borrow_mut().insert(key.to_string(), value.to_vec());
            Ok(())
        }

        async fn delete(&self, key: &str) -> kairos_types::Result<()> {
            self.values.borrow_mut().remove(key);
            Ok(())
        }

        async fn list_keys(&self, prefix: &str) -> kairos_types::Result<Vec<String>> {
            let mut keys: Vec<String> = self
                .values
                .borrow()
                .keys()
                .filter(|k| k.starts_with(prefix))
                .cloned()
                .collect();
            keys.sort();
            Ok(keys)
        }

        fn backend_name(&self) -> &str {
            "map"
        }
    }

    #[test]
    fn test_settings_default_until_saved() {
        block_on(async {
            let svc = SettingsService::new(Rc::new(MapStorage::new()));
            assert_eq!(svc.ai().await.unwrap(), AiSettings::default());
            assert_eq!(svc.general().await.unwrap(), GeneralSettings::default());
        });
    }

    #[test]
    fn test_settings_save_and_reload() {
        block_on(async {
            let storage = Rc::new(MapStorage::new());
            let svc = SettingsService::new(storage.clone());
            let ai = AiSettings {
                api_key: "  sk-test ".to_string(),
                modelo: "gpt-4o".to_string(),
                activo: true,
                ..AiSettings::default()
            };
            assert_eq!(svc.save_ai(&ai).await.unwrap().api_key, "sk-test");

            let general = GeneralSettings {
                evento_nombre: " Feria de Salud Natural ".to_string(),
                ubicacion: "Stand 12".to_string(),
                voz_activa: false,
                modo_offline: true,
            };
            svc.save_general(&general).await.unwrap();

            let reloaded = SettingsService::new(storage);
            let ai = reloaded.ai().await.unwrap();
            assert_eq!(ai.modelo, "gpt-4o");
            assert_eq!(ai.api_key, "sk-test");
            let general = reloaded.general().await.unwrap();
            assert_eq!(general.evento_nombre, "Feria de Salud Natural");
            assert!(!general.voz_activa);
            assert!(general.modo_offline);
        });
    }

    #[test]
    fn test_settings_reject_invalid_ai_form() {
        block_on(async {
            let storage = Rc::new(MapStorage::new());
            let svc = SettingsService::new(storage.clone());
            let bad = AiSettings {
                modelo: "llama".to_string(),
                temperatura: 1.5,
                max_tokens: 0,
                consultas_por_dia: 0,
                costo_maximo_dia: -1.0,
                activo: true,
                api_key: " ".to_string(),
            };
            let err = svc.save_ai(&bad).await.unwrap_err();
            assert_eq!(
                err,
                KioskError::Validation(vec![
                    ERR_MODEL.to_string(),
                    ERR_TEMPERATURE.to_string(),
                    ERR_MAX_TOKENS.to_string(),
                    ERR_DAILY_LIMIT.to_string(),
                    ERR_DAILY_COST.to_string(),
                    ERR_API_KEY.to_string(),
                ])
            );
            assert!(storage.values.borrow().is_empty());
            assert!(validate_ai(&AiSettings::default()).is_empty());
        });
    }
}
