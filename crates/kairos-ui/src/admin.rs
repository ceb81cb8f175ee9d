//! State for the admin panels: dashboard, catalog, history, learning,
//! AI usage and settings.

use chrono::NaiveDate;
use kairos_core::catalog::ImportSummary;
use kairos_core::dashboard::Dashboard;
use kairos_core::history::{HistoryFilter, HistoryView};
use kairos_core::learning::{KnowledgeView, PatternPage};
use kairos_core::reporting::UsageReport;
use kairos_types::api::BackendInfo;
use kairos_types::history::ConsultationRecord;
use kairos_types::learning::LearningExport;
use kairos_types::product::{Product, ProductForm};
use kairos_types::settings::{AiSettings, GeneralSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminTab {
    Dashboard,
    Products,
    History,
    Learning,
    Usage,
    Settings,
}

/// Sub-page of the learning tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearningView {
    Patterns,
    Knowledge,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendStatus {
    Unknown,
    Online(BackendInfo),
    Offline,
}

/// Outcome banner above the active tab
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub messages: Vec<String>,
    pub success: bool,
}

pub struct AdminState {
    pub tab: AdminTab,
    pub feedback: Option<Feedback>,
    pub dashboard: Option<Dashboard>,

    pub products: Vec<Product>,
    pub active_count: usize,
    pub form: ProductForm,
    /// Product being edited; `None` while creating
    pub editing: Option<u64>,
    /// Pasted tab-separated sheet for bulk import
    pub sheet_text: String,
    pub last_import: Option<ImportSummary>,

    pub consultations: Vec<ConsultationRecord>,
    pub history: HistoryView,
    /// Filter inputs, `AAAA-MM-DD`
    pub history_desde: String,
    pub history_hasta: String,
    pub history_buscar: String,
    /// Consultation shown in the detail view
    pub detail: Option<ConsultationRecord>,
    pub history_json: String,

    pub learning: LearningExport,
    pub learning_view: LearningView,
    pub patterns: PatternPage,
    /// Empty shows every intent
    pub pattern_intent: String,
    pub knowledge: KnowledgeView,
    pub learning_json: String,

    /// Pasted JSON export of the usage log
    pub usage_json: String,
    pub report: Option<UsageReport>,

    pub ai_form: AiSettings,
    pub general_form: GeneralSettings,
    pub backend: BackendStatus,
    pub backend_url: String,
}

impl AdminState {
    pub fn new() -> Self {
        Self {
            tab: AdminTab::Dashboard,
            feedback: None,
            dashboard: None,
            products: Vec::new(),
            active_count: 0,
            form: blank_form(),
            editing: None,
            sheet_text: String::new(),
            last_import: None,
            consultations: Vec::new(),
            history: HistoryView::default(),
            history_desde: String::new(),
            history_hasta: String::new(),
            history_buscar: String::new(),
            detail: None,
            history_json: String::new(),
            learning: LearningExport::default(),
            learning_view: LearningView::Patterns,
            patterns: PatternPage::default(),
            pattern_intent: String::new(),
            knowledge: KnowledgeView::default(),
            learning_json: String::new(),
            usage_json: String::new(),
            report: None,
            ai_form: AiSettings::default(),
            general_form: GeneralSettings::default(),
            backend: BackendStatus::Unknown,
            backend_url: String::new(),
        }
    }

    pub fn set_products(&mut self, products: Vec<Product>) {
        self.active_count = products.iter().filter(|p| p.activo).count();
        self.products = products;
    }

    pub fn begin_edit(&mut self, product: &Product) {
        self.editing = Some(product.id);
        self.form = ProductForm::from(product);
        self.feedback = None;
    }

    pub fn reset_form(&mut self) {
        self.editing = None;
        self.form = blank_form();
    }

    pub fn show_errors(&mut self, messages: Vec<String>) {
        self.feedback = Some(Feedback {
            messages,
            success: false,
        });
    }

    pub fn show_notice(&mut self, message: impl Into<String>) {
        self.feedback = Some(Feedback {
            messages: vec![message.into()],
            success: true,
        });
    }

    /// Record a finished import and summarize it in the banner.
    pub fn finish_import(&mut self, summary: ImportSummary) {
        let notice = format!(
            "Importados: {}, actualizados: {}, omitidos: {}",
            summary.imported, summary.updated, summary.skipped
        );
        if summary.errors.is_empty() {
            self.show_notice(notice);
            self.sheet_text.clear();
        } else {
            let mut messages = vec![notice];
            messages.extend(summary.errors.iter().cloned());
            self.show_errors(messages);
        }
        self.last_import = Some(summary);
    }

    // ─── History ─────────────────────────────────────────────

    /// Fill the date inputs with the default range the first time history loads.
    pub fn default_history_range(&mut self, today: NaiveDate) {
        if self.history_desde.is_empty() && self.history_hasta.is_empty() {
            let range = HistoryFilter::recent(today);
            self.history_desde = range.desde.format("%Y-%m-%d").to_string();
            self.history_hasta = range.hasta.format("%Y-%m-%d").to_string();
        }
    }

    pub fn set_consultations(&mut self, records: Vec<ConsultationRecord>) {
        self.consultations = records;
        self.apply_history_filter();
    }

    /// Re-run the history query from the filter inputs. Bad dates leave the
    /// listing as it was and report why.
    pub fn apply_history_filter(&mut self) -> bool {
        match HistoryFilter::parse(&self.history_desde, &self.history_hasta, &self.history_buscar) {
            Ok(filter) => {
                self.history = HistoryView::build(&self.consultations, &filter);
                true
            }
            Err(messages) => {
                self.show_errors(messages);
                false
            }
        }
    }

    // ─── Learning ────────────────────────────────────────────

    pub fn set_learning(&mut self, export: LearningExport) {
        self.knowledge = KnowledgeView::build(&export.conocimientos);
        self.learning = export;
        if !self.learning.patrones.iter().any(|p| p.intencion_detectada == self.pattern_intent) {
            self.pattern_intent.clear();
        }
        self.show_pattern_page(1);
    }

    pub fn show_pattern_page(&mut self, page: usize) {
        self.patterns = PatternPage::build(&self.learning, Some(&self.pattern_intent), page);
    }

    // ─── Settings ────────────────────────────────────────────

    pub fn set_settings(&mut self, ai: AiSettings, general: GeneralSettings) {
        self.ai_form = ai;
        self.general_form = general;
    }
}

impl Default for AdminState {
    fn default() -> Self {
        Self::new()
    }
}

/// New products start active
fn blank_form() -> ProductForm {
    ProductForm {
        activo: true,
        ..ProductForm::default()
    }
}
