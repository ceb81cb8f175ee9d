//! Main egui application: composes the screens and drives the session controller.

use std::cell::RefCell;
use std::rc::Rc;

use egui::{self, CentralPanel};
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen_futures::spawn_local;

use chrono::NaiveDate;
use kairos_core::catalog::{friendly_messages, parse_tsv, to_tsv, CatalogService, ImportSummary};
use kairos_core::controller::SessionController;
use kairos_core::dashboard::Dashboard;
use kairos_core::event_bus::EventBus;
use kairos_core::ports::{
    BackendPort, ClockPort, ConsultationLogPort, LearningPort, StoragePort, UsageLogPort, VoicePort,
};
use kairos_core::reporting::UsageReport;
use kairos_core::settings::SettingsService;
use kairos_core::validation::{parse_age, validate_identity};
use kairos_platform::download::{download_text, TSV_MIME};
use kairos_platform::env::{clear_override, reload_page, save_override, with_backend_url};
use kairos_platform::{
    BrowserClock, HttpBackend, StorageCatalog, StorageConsultationLog, StorageLearning, StorageUsageLog,
    WebSpeechVoice,
};
use kairos_types::config::KioskConfig;
use kairos_types::history::ConsultationRecord;
use kairos_types::learning::LearningExport;
use kairos_types::product::Product;
use kairos_types::settings::{AiSettings, GeneralSettings};
use kairos_types::KioskError;
use kairos_ui::admin::BackendStatus;
use kairos_ui::panels::{admin_panel, kiosk_panel};
use kairos_ui::{theme, AdminAction, AdminTab, DictationTarget, UiAction, UiState};

/// Controller clock pump
const TICK_MS: u32 = 1_000;

/// Results of background work, applied to `UiState` on the next frame
enum AppUpdate {
    Products(Vec<Product>),
    Report(UsageReport),
    Errors(Vec<String>),
    Notice(String),
    ProductSaved,
    Imported(ImportSummary),
    UsageLoaded,
    Dashboard(Dashboard),
    Consultations(Vec<ConsultationRecord>),
    HistoryLoaded,
    Detail(ConsultationRecord),
    Learning(LearningExport),
    LearningLoaded,
    Settings(AiSettings, GeneralSettings),
    AiSaved(AiSettings),
    /// Saved or loaded at startup; also applied to the kiosk screens
    General(GeneralSettings),
    Backend(BackendStatus),
    Dictated(DictationTarget, String),
    DictationEnded,
}

type Inbox = Rc<RefCell<Vec<AppUpdate>>>;

/// Storage-backed services behind the admin panels
struct AdminServices {
    catalog: CatalogService,
    usage_log: StorageUsageLog,
    consultations: StorageConsultationLog,
    learning: StorageLearning,
    settings: SettingsService,
    clock: Rc<dyn ClockPort>,
    utc_offset_minutes: i32,
}

impl AdminServices {
    fn today(&self) -> NaiveDate {
        self.clock.local_date(self.utc_offset_minutes)
    }
}

/// The main application state
pub struct KioskApp {
    ui_state: UiState,
    event_bus: EventBus,
    controller: SessionController,
    services: Rc<AdminServices>,
    config: KioskConfig,
    inbox: Inbox,
    first_frame: bool,
}

impl KioskApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: KioskConfig, storage: Rc<dyn StoragePort>) -> Self {
        let event_bus = EventBus::new();
        let clock: Rc<dyn ClockPort> = Rc::new(BrowserClock);
        let backend: Rc<dyn BackendPort> = Rc::new(HttpBackend::new(&config));
        let voice: Rc<dyn VoicePort> = Rc::new(WebSpeechVoice::new(
            &config.voice,
            config.timings.voice_timeout_ms,
        ));

        let controller = SessionController::new(&config, backend, voice.clone(), clock.clone(), event_bus.clone());
        let services = Rc::new(AdminServices {
            catalog: CatalogService::new(Rc::new(StorageCatalog::new(storage.clone())), clock.clone())
                .with_utc_offset(config.utc_offset_minutes),
            usage_log: StorageUsageLog::new(storage.clone()),
            consultations: StorageConsultationLog::new(storage.clone()),
            learning: StorageLearning::new(storage.clone()),
            settings: SettingsService::new(storage),
            clock,
            utc_offset_minutes: config.utc_offset_minutes,
        });

        let mut ui_state = UiState::new();
        ui_state.voice_available = voice.is_available();
        ui_state.voice_enabled = voice.is_enabled();
        ui_state.admin.backend_url = config.api_base_url.clone();

        let app = Self {
            ui_state,
            event_bus,
            controller,
            services,
            config,
            inbox: Rc::new(RefCell::new(Vec::new())),
            first_frame: true,
        };

        app.start_background(&cc.egui_ctx);
        app.spawn_admin(&cc.egui_ctx, |svc| async move {
            match svc.settings.general().await {
                Ok(general) => vec![AppUpdate::General(general)],
                Err(e) => {
                    log::warn!("General settings unreadable, using defaults: {}", e);
                    Vec::new()
                }
            }
        });
        app
    }

    /// Health check, the statistics loop and the one-second timer pump.
    fn start_background(&self, ctx: &egui::Context) {
        let controller = self.controller.clone();
        let repaint = ctx.clone();
        spawn_local(async move {
            if controller.check_backend().await {
                controller.refresh_statistics().await;
            }
            repaint.request_repaint();
        });

        let controller = self.controller.clone();
        let repaint = ctx.clone();
        let refresh_ms = self.config.timings.stats_refresh_ms.min(u32::MAX as u64) as u32;
        spawn_local(async move {
            loop {
                TimeoutFuture::new(refresh_ms).await;
                controller.refresh_statistics().await;
                repaint.request_repaint();
            }
        });

        let controller = self.controller.clone();
        let repaint = ctx.clone();
        spawn_local(async move {
            loop {
                TimeoutFuture::new(TICK_MS).await;
                // Timers are evaluated synchronously; a due diagnosis runs in
                // its own task so the pump keeps ticking meanwhile.
                let tick = controller.clone();
                let ctx = repaint.clone();
                spawn_local(async move {
                    if let Err(e) = tick.tick().await {
                        log::error!("Timer action failed: {}", e);
                    }
                    ctx.request_repaint();
                });
                repaint.request_repaint();
            }
        });
    }

    fn apply_updates(&mut self) {
        let updates: Vec<AppUpdate> = self.inbox.borrow_mut().drain(..).collect();
        for update in updates {
            let admin = &mut self.ui_state.admin;
            match update {
                AppUpdate::Products(products) => admin.set_products(products),
                AppUpdate::Report(report) => admin.report = Some(report),
                AppUpdate::Errors(messages) => admin.show_errors(messages),
                AppUpdate::Notice(message) => admin.show_notice(message),
                AppUpdate::ProductSaved => admin.reset_form(),
                AppUpdate::Imported(summary) => admin.finish_import(summary),
                AppUpdate::UsageLoaded => admin.usage_json.clear(),
                AppUpdate::Dashboard(dashboard) => admin.dashboard = Some(dashboard),
                AppUpdate::Consultations(records) => admin.set_consultations(records),
                AppUpdate::HistoryLoaded => admin.history_json.clear(),
                AppUpdate::Detail(record) => {
                    admin.detail = Some(record);
                    admin.tab = AdminTab::History;
                }
                AppUpdate::Learning(export) => admin.set_learning(export),
                AppUpdate::LearningLoaded => admin.learning_json.clear(),
                AppUpdate::Settings(ai, general) => admin.set_settings(ai, general),
                AppUpdate::AiSaved(ai) => admin.ai_form = ai,
                AppUpdate::General(general) => {
                    admin.general_form = general.clone();
                    self.ui_state.apply_general(&general);
                    self.ui_state.voice_enabled = self.controller.set_voice(general.voz_activa);
                }
                AppUpdate::Backend(status) => admin.backend = status,
                AppUpdate::Dictated(target, text) => {
                    self.ui_state.apply_dictation(target, &text);
                    self.ui_state.dictating = None;
                }
                AppUpdate::DictationEnded => self.ui_state.dictating = None,
            }
        }
    }
}

impl eframe::App for KioskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.first_frame {
            theme::apply_theme(ctx);
            self.first_frame = false;
        }

        // Any press or keystroke counts as activity for the inactivity guard
        let active = ctx.input(|i| {
            i.events.iter().any(|e| {
                matches!(
                    e,
                    egui::Event::PointerButton { pressed: true, .. }
                        | egui::Event::Key { pressed: true, .. }
                        | egui::Event::Text(_)
                        | egui::Event::Touch { .. }
                )
            })
        });
        if active {
            self.controller.touch();
        }

        // Drain events from the session controller
        let events = self.event_bus.drain();
        if !events.is_empty() {
            self.ui_state.process_events(events);
            ctx.request_repaint();
        }
        self.apply_updates();
        self.ui_state.busy = self.controller.is_busy();

        if self.ui_state.busy || self.ui_state.dictating.is_some() {
            ctx.request_repaint();
        }

        if self.ui_state.show_admin && self.ui_state.in_session() {
            // a session started elsewhere wins over the admin view
            self.ui_state.show_admin = false;
        }

        let action = CentralPanel::default()
            .show(ctx, |ui| {
                if self.ui_state.show_admin {
                    admin_panel(ui, &mut self.ui_state)
                } else {
                    kiosk_panel(ui, &mut self.ui_state)
                }
            })
            .inner;

        if let Some(action) = action {
            self.dispatch(action, ctx);
        }
    }
}

impl KioskApp {
    /// Route one UI action to the controller or the admin services
    fn dispatch(&mut self, action: UiAction, ctx: &egui::Context) {
        log::debug!("UI action: {:?}", action);
        match action {
            UiAction::Start => self.spawn_session(ctx, |c| async move { c.start().await }),
            UiAction::CaptureIdentity { nombre, dni, edad } => match parse_age(&edad) {
                Ok(edad) => self.spawn_session(ctx, move |c| async move {
                    c.capture_identity(&nombre, &dni, edad).await
                }),
                Err(age_error) => {
                    let mut errors = validate_identity(&nombre, &dni, None);
                    errors.push(age_error);
                    self.ui_state.validation = errors;
                }
            },
            UiAction::SendMessage(text) => {
                self.spawn_session(ctx, move |c| async move { c.send_message(&text).await })
            }
            UiAction::GenerateDiagnosis => {
                self.spawn_session(ctx, |c| async move { c.generate_diagnosis().await })
            }
            UiAction::PrintReceipt => self.spawn_session(ctx, |c| async move { c.print_receipt().await }),
            UiAction::Finalize => self.spawn_session(ctx, |c| async move { c.finalize().await }),
            UiAction::Reset => self.controller.reset(),
            UiAction::Dictate(target) => self.dictate(target, ctx),
            UiAction::ToggleVoice => {
                self.ui_state.voice_enabled = self.controller.toggle_voice();
            }
            UiAction::OpenAdmin => {
                if !self.ui_state.in_session() {
                    self.ui_state.show_admin = true;
                    self.reload_admin(ctx);
                }
            }
            UiAction::CloseAdmin => self.ui_state.show_admin = false,
            UiAction::Admin(admin_action) => self.dispatch_admin(admin_action, ctx),
        }
    }

    /// Run a controller operation in the background. Failures already
    /// reached the UI through the event bus; they are only logged here.
    fn spawn_session<F, Fut>(&self, ctx: &egui::Context, op: F)
    where
        F: FnOnce(SessionController) -> Fut + 'static,
        Fut: std::future::Future<Output = kairos_types::Result<()>> + 'static,
    {
        let controller = self.controller.clone();
        let ctx = ctx.clone();
        spawn_local(async move {
            if let Err(e) = op(controller).await {
                log::warn!("Session operation failed: {}", e);
            }
            ctx.request_repaint();
        });
    }

    fn dictate(&mut self, target: DictationTarget, ctx: &egui::Context) {
        if self.ui_state.dictating.is_some() {
            return;
        }
        self.ui_state.dictating = Some(target);
        let controller = self.controller.clone();
        let inbox = self.inbox.clone();
        let ctx = ctx.clone();
        spawn_local(async move {
            let update = match controller.dictate().await {
                Ok(text) if !text.is_empty() => AppUpdate::Dictated(target, text),
                Ok(_) => AppUpdate::DictationEnded,
                Err(e) => {
                    log::warn!("Dictation unavailable: {}", e);
                    AppUpdate::DictationEnded
                }
            };
            inbox.borrow_mut().push(update);
            ctx.request_repaint();
        });
    }

    // ─── Admin ───────────────────────────────────────────────

    fn dispatch_admin(&mut self, action: AdminAction, ctx: &egui::Context) {
        let admin = &mut self.ui_state.admin;
        match action {
            AdminAction::Reload => self.reload_admin(ctx),
            AdminAction::EditProduct(id) => {
                if let Some(product) = admin.products.iter().find(|p| p.id == id).cloned() {
                    admin.begin_edit(&product);
                }
            }
            AdminAction::CancelEdit => admin.reset_form(),
            AdminAction::SaveProduct => {
                let form = admin.form.clone();
                let editing = admin.editing;
                self.spawn_admin(ctx, move |svc| async move {
                    let result = match editing {
                        Some(id) => svc.catalog.update_product(id, &form).await,
                        None => svc.catalog.create_product(&form).await,
                    };
                    match result {
                        Ok(product) => {
                            log::info!("Product saved: {} ({})", product.nombre, product.codigo_producto);
                            let mut updates = vec![
                                AppUpdate::ProductSaved,
                                AppUpdate::Notice(format!("Producto \"{}\" guardado", product.nombre)),
                            ];
                            updates.extend(products_update(&svc).await);
                            updates
                        }
                        Err(e) => vec![AppUpdate::Errors(friendly_messages(&e))],
                    }
                });
            }
            AdminAction::DeleteProduct(id) => {
                if admin.editing == Some(id) {
                    admin.reset_form();
                }
                self.spawn_admin(ctx, move |svc| async move {
                    match svc.catalog.delete_product(id).await {
                        Ok(()) => {
                            let mut updates = vec![AppUpdate::Notice("Producto eliminado".to_string())];
                            updates.extend(products_update(&svc).await);
                            updates
                        }
                        Err(e) => vec![AppUpdate::Errors(friendly_messages(&e))],
                    }
                });
            }
            AdminAction::Export => {
                self.spawn_admin(ctx, |svc| async move {
                    let rows = match svc.catalog.export_rows().await {
                        Ok(rows) => rows,
                        Err(e) => return vec![AppUpdate::Errors(friendly_messages(&e))],
                    };
                    let stamp = svc.clock.local_datetime(svc.utc_offset_minutes);
                    let filename = format!("productos_{}.tsv", stamp.format("%Y-%m-%d_%H%M%S"));
                    match download_text(&filename, &to_tsv(&rows), TSV_MIME) {
                        Ok(()) => vec![AppUpdate::Notice(format!("{} productos exportados", rows.len()))],
                        Err(e) => {
                            log::error!("Export failed: {}", e);
                            vec![AppUpdate::Errors(vec!["No se pudo exportar el catálogo".to_string()])]
                        }
                    }
                });
            }
            AdminAction::ImportSheet => {
                let rows = parse_tsv(&admin.sheet_text);
                self.spawn_admin(ctx, move |svc| async move {
                    let summary = svc.catalog.import_rows(&rows).await;
                    let mut updates = vec![AppUpdate::Imported(summary)];
                    updates.extend(products_update(&svc).await);
                    updates
                });
            }
            AdminAction::ImportUsage => {
                let json = admin.usage_json.clone();
                self.spawn_admin(ctx, move |svc| async move {
                    match svc.usage_log.import_json(&json).await {
                        Ok(count) => {
                            let mut updates = vec![
                                AppUpdate::UsageLoaded,
                                AppUpdate::Notice(format!("{} registros de uso cargados", count)),
                            ];
                            updates.extend(report_update(&svc).await);
                            updates
                        }
                        Err(e) => {
                            log::warn!("Usage log import failed: {}", e);
                            vec![AppUpdate::Errors(vec!["El registro no es un JSON válido".to_string()])]
                        }
                    }
                });
            }
            AdminAction::ClearUsage => {
                self.spawn_admin(ctx, |svc| async move {
                    match svc.usage_log.clear().await {
                        Ok(()) => {
                            let mut updates = vec![AppUpdate::Notice("Registro de uso vaciado".to_string())];
                            updates.extend(report_update(&svc).await);
                            updates
                        }
                        Err(e) => vec![AppUpdate::Errors(vec![e.to_string()])],
                    }
                });
            }

            AdminAction::ImportHistory => {
                let json = admin.history_json.clone();
                self.spawn_admin(ctx, move |svc| async move {
                    match svc.consultations.import_json(&json).await {
                        Ok(count) => {
                            let mut updates = vec![
                                AppUpdate::HistoryLoaded,
                                AppUpdate::Notice(format!("{} consultas cargadas", count)),
                            ];
                            updates.extend(consultations_update(&svc).await);
                            updates.extend(dashboard_update(&svc).await);
                            updates
                        }
                        Err(e) => {
                            log::warn!("Consultation import failed: {}", e);
                            vec![AppUpdate::Errors(vec!["Las consultas no son un JSON válido".to_string()])]
                        }
                    }
                });
            }
            AdminAction::ClearHistory => {
                admin.detail = None;
                self.spawn_admin(ctx, |svc| async move {
                    match svc.consultations.clear().await {
                        Ok(()) => {
                            let mut updates = vec![AppUpdate::Notice("Historial vaciado".to_string())];
                            updates.extend(consultations_update(&svc).await);
                            updates.extend(dashboard_update(&svc).await);
                            updates
                        }
                        Err(e) => vec![AppUpdate::Errors(vec![e.to_string()])],
                    }
                });
            }
            AdminAction::FilterHistory => {
                if admin.apply_history_filter() {
                    admin.feedback = None;
                }
            }
            AdminAction::OpenConsultation(id) => {
                self.spawn_admin(ctx, move |svc| async move {
                    match svc.consultations.consultation(id).await {
                        Ok(Some(record)) => vec![AppUpdate::Detail(record)],
                        Ok(None) => vec![AppUpdate::Errors(vec!["Consulta no encontrada".to_string()])],
                        Err(e) => vec![AppUpdate::Errors(vec![e.to_string()])],
                    }
                });
            }
            AdminAction::CloseConsultation => admin.detail = None,

            AdminAction::ImportLearning => {
                let json = admin.learning_json.clone();
                self.spawn_admin(ctx, move |svc| async move {
                    match svc.learning.import_json(&json).await {
                        Ok(count) => {
                            let mut updates = vec![
                                AppUpdate::LearningLoaded,
                                AppUpdate::Notice(format!("{} patrones cargados", count)),
                            ];
                            updates.extend(learning_update(&svc).await);
                            updates.extend(dashboard_update(&svc).await);
                            updates
                        }
                        Err(e) => {
                            log::warn!("Learning import failed: {}", e);
                            vec![AppUpdate::Errors(vec!["El aprendizaje no es un JSON válido".to_string()])]
                        }
                    }
                });
            }
            AdminAction::ClearLearning => {
                self.spawn_admin(ctx, |svc| async move {
                    match svc.learning.clear().await {
                        Ok(()) => {
                            let mut updates = vec![AppUpdate::Notice("Aprendizaje vaciado".to_string())];
                            updates.extend(learning_update(&svc).await);
                            updates.extend(dashboard_update(&svc).await);
                            updates
                        }
                        Err(e) => vec![AppUpdate::Errors(vec![e.to_string()])],
                    }
                });
            }
            AdminAction::PatternPage(page) => admin.show_pattern_page(page),
            AdminAction::FilterPatterns => admin.show_pattern_page(1),

            AdminAction::SaveAiSettings => {
                let form = admin.ai_form.clone();
                self.spawn_admin(ctx, move |svc| async move {
                    match svc.settings.save_ai(&form).await {
                        Ok(saved) => vec![
                            AppUpdate::AiSaved(saved),
                            AppUpdate::Notice("Configuración de IA guardada".to_string()),
                        ],
                        Err(e) => vec![AppUpdate::Errors(error_messages(&e))],
                    }
                });
            }
            AdminAction::SaveGeneralSettings => {
                let form = admin.general_form.clone();
                self.spawn_admin(ctx, move |svc| async move {
                    match svc.settings.save_general(&form).await {
                        Ok(saved) => vec![
                            AppUpdate::General(saved),
                            AppUpdate::Notice("Configuración general guardada".to_string()),
                        ],
                        Err(e) => vec![AppUpdate::Errors(error_messages(&e))],
                    }
                });
            }
            AdminAction::CheckBackend => {
                let controller = self.controller.clone();
                let inbox = self.inbox.clone();
                let ctx = ctx.clone();
                spawn_local(async move {
                    let status = match controller.backend_info().await {
                        Ok(info) => BackendStatus::Online(info),
                        Err(_) => BackendStatus::Offline,
                    };
                    inbox.borrow_mut().push(AppUpdate::Backend(status));
                    ctx.request_repaint();
                });
            }
            AdminAction::SaveBackendUrl => {
                let saved = with_backend_url(&self.config, &admin.backend_url).and_then(|config| {
                    save_override(&config)?;
                    log::info!("Backend URL changed to {}", config.base_url());
                    reload_page()
                });
                if let Err(e) = saved {
                    admin.show_errors(error_messages(&e));
                }
            }
            AdminAction::ClearBackendUrl => {
                if let Err(e) = clear_override().and_then(|_| reload_page()) {
                    admin.show_errors(error_messages(&e));
                }
            }
        }
    }

    fn reload_admin(&mut self, ctx: &egui::Context) {
        self.ui_state.admin.default_history_range(self.services.today());
        self.spawn_admin(ctx, |svc| async move {
            let mut updates = products_update(&svc).await;
            updates.extend(report_update(&svc).await);
            updates.extend(consultations_update(&svc).await);
            updates.extend(learning_update(&svc).await);
            updates.extend(settings_update(&svc).await);
            updates.extend(dashboard_update(&svc).await);
            updates
        });
    }

    /// Run admin work in the background and queue its updates for the next frame
    fn spawn_admin<F, Fut>(&self, ctx: &egui::Context, work: F)
    where
        F: FnOnce(Rc<AdminServices>) -> Fut + 'static,
        Fut: std::future::Future<Output = Vec<AppUpdate>> + 'static,
    {
        let services = self.services.clone();
        let inbox = self.inbox.clone();
        let ctx = ctx.clone();
        spawn_local(async move {
            let updates = work(services).await;
            inbox.borrow_mut().extend(updates);
            ctx.request_repaint();
        });
    }
}

/// Form errors come back one per line; anything else is a single message
fn error_messages(err: &KioskError) -> Vec<String> {
    match err {
        KioskError::Validation(messages) => messages.clone(),
        other => vec![other.to_string()],
    }
}

async fn products_update(svc: &AdminServices) -> Vec<AppUpdate> {
    match svc.catalog.list_products().await {
        Ok(products) => vec![AppUpdate::Products(products)],
        Err(e) => vec![AppUpdate::Errors(friendly_messages(&e))],
    }
}

async fn report_update(svc: &AdminServices) -> Vec<AppUpdate> {
    match svc.usage_log.entries().await {
        Ok(entries) => vec![AppUpdate::Report(UsageReport::build(&entries, svc.today()))],
        Err(e) => {
            log::error!("Cannot read usage log: {}", e);
            vec![AppUpdate::Errors(vec!["No se pudo leer el registro de uso".to_string()])]
        }
    }
}

async fn consultations_update(svc: &AdminServices) -> Vec<AppUpdate> {
    match svc.consultations.consultations().await {
        Ok(records) => vec![AppUpdate::Consultations(records)],
        Err(e) => {
            log::error!("Cannot read consultations: {}", e);
            vec![AppUpdate::Errors(vec!["No se pudo leer el historial de consultas".to_string()])]
        }
    }
}

async fn learning_update(svc: &AdminServices) -> Vec<AppUpdate> {
    match svc.learning.learning().await {
        Ok(export) => vec![AppUpdate::Learning(export)],
        Err(e) => {
            log::error!("Cannot read learning export: {}", e);
            vec![AppUpdate::Errors(vec!["No se pudo leer el aprendizaje".to_string()])]
        }
    }
}

async fn settings_update(svc: &AdminServices) -> Vec<AppUpdate> {
    match (svc.settings.ai().await, svc.settings.general().await) {
        (Ok(ai), Ok(general)) => vec![AppUpdate::Settings(ai, general)],
        (Err(e), _) | (_, Err(e)) => {
            log::error!("Cannot read settings: {}", e);
            vec![AppUpdate::Errors(vec!["No se pudo leer la configuración".to_string()])]
        }
    }
}

async fn dashboard_update(svc: &AdminServices) -> Vec<AppUpdate> {
    let consultations = match svc.consultations.consultations().await {
        Ok(records) => records,
        Err(e) => {
            log::error!("Dashboard without consultations: {}", e);
            Vec::new()
        }
    };
    let patterns = match svc.learning.learning().await {
        Ok(export) => export.patrones.len(),
        Err(e) => {
            log::error!("Dashboard without learning export: {}", e);
            0
        }
    };
    let active = match svc.catalog.count_active().await {
        Ok(count) => count,
        Err(e) => {
            log::error!("Dashboard without catalog: {}", e);
            0
        }
    };
    vec![AppUpdate::Dashboard(Dashboard::build(&consultations, patterns, active, svc.today()))]
}
