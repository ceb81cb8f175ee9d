//! Screen and admin panels. Each returns the action the user asked for, if any.

pub mod chat;
pub mod dashboard;
pub mod datos;
pub mod espera;
pub mod history;
pub mod learning;
pub mod products;
pub mod settings;
pub mod status;
pub mod usage;

use egui::{Color32, RichText};
use kairos_core::learning::ConfidenceBand;
use kairos_types::session::Screen;

use crate::action::{AdminAction, UiAction};
use crate::admin::AdminTab;
use crate::state::UiState;
use crate::theme::*;

/// Render the screen for the current session state.
pub fn kiosk_panel(ui: &mut egui::Ui, state: &mut UiState) -> Option<UiAction> {
    match state.screen {
        Screen::Espera => espera::espera_panel(ui, state),
        Screen::Datos => datos::datos_panel(ui, state),
        Screen::Chat => chat::chat_panel(ui, state),
        Screen::Generando => {
            status::generando_panel(ui);
            None
        }
        Screen::Despedida => {
            status::despedida_panel(ui, state);
            None
        }
        Screen::Error => status::error_panel(ui, state),
    }
}

/// Render the admin area: tab strip plus the active tab.
pub fn admin_panel(ui: &mut egui::Ui, state: &mut UiState) -> Option<UiAction> {
    let mut action = None;

    ui.horizontal(|ui| {
        ui.heading(RichText::new("Administración").color(TEXT_PRIMARY).strong());
        ui.add_space(16.0);
        let admin = &mut state.admin;
        for (tab, label) in [
            (AdminTab::Dashboard, "Inicio"),
            (AdminTab::Products, "Productos"),
            (AdminTab::History, "Consultas"),
            (AdminTab::Learning, "Aprendizaje"),
            (AdminTab::Usage, "Uso de IA"),
            (AdminTab::Settings, "Configuración"),
        ] {
            if ui.selectable_value(&mut admin.tab, tab, label).clicked() {
                action = Some(UiAction::Admin(AdminAction::Reload));
            }
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Volver al kiosko").clicked() {
                action = Some(UiAction::CloseAdmin);
            }
        });
    });
    ui.separator();

    if let Some(fb) = &state.admin.feedback {
        let color = if fb.success { SUCCESS } else { ERROR };
        for message in &fb.messages {
            ui.label(RichText::new(message).color(color).small());
        }
        ui.add_space(4.0);
    }

    let inner = match state.admin.tab {
        AdminTab::Dashboard => dashboard::dashboard_panel(ui, &state.admin),
        AdminTab::Products => products::products_panel(ui, &mut state.admin),
        AdminTab::History => history::history_panel(ui, &mut state.admin),
        AdminTab::Learning => learning::learning_panel(ui, &mut state.admin),
        AdminTab::Usage => usage::usage_panel(ui, &mut state.admin),
        AdminTab::Settings => settings::settings_panel(ui, &mut state.admin),
    };
    action.or(inner)
}

/// Headline number in a white box, dashboard style.
pub(crate) fn stat_box(ui: &mut egui::Ui, title: &str, value: impl Into<String>, color: Color32) {
    egui::Frame::default()
        .fill(BG_SECONDARY)
        .inner_margin(PANEL_PADDING)
        .corner_radius(PANEL_ROUNDING)
        .show(ui, |ui| {
            ui.label(RichText::new(title).color(TEXT_SECONDARY).small());
            ui.label(RichText::new(value.into()).color(color).strong().size(28.0));
        });
}

/// Paste box for a backend JSON export with load and clear buttons.
pub(crate) fn json_loader(
    ui: &mut egui::Ui,
    title: &str,
    hint: &str,
    text: &mut String,
    load: AdminAction,
    clear: AdminAction,
) -> Option<UiAction> {
    let mut action = None;
    ui.label(RichText::new(title).color(ACCENT).strong());
    ui.label(RichText::new(hint).color(TEXT_SECONDARY).small());
    ui.add(
        egui::TextEdit::multiline(text)
            .desired_rows(4)
            .desired_width(f32::INFINITY)
            .code_editor(),
    );
    ui.horizontal(|ui| {
        if ui
            .add_enabled(!text.trim().is_empty(), egui::Button::new("Cargar"))
            .clicked()
        {
            action = Some(UiAction::Admin(load));
        }
        if ui.button("Vaciar").clicked() {
            action = Some(UiAction::Admin(clear));
        }
    });
    action
}

/// Confidence ratio as a colored percentage
pub(crate) fn confidence_label(ratio: f64) -> RichText {
    let color = match ConfidenceBand::of(ratio) {
        ConfidenceBand::High => SUCCESS,
        ConfidenceBand::Medium => WARNING,
        ConfidenceBand::Low => ERROR,
    };
    RichText::new(format!("{:.0}%", ratio * 100.0)).color(color)
}

/// Microphone button shown next to a dictatable field.
pub(crate) fn mic_button(ui: &mut egui::Ui, state: &UiState, listening: bool) -> bool {
    if !state.voice_available || !state.voice_enabled {
        return false;
    }
    let label = if listening { "🔴" } else { "🎤" };
    ui.add_enabled(state.dictating.is_none(), egui::Button::new(label))
        .on_hover_text("Dictar")
        .clicked()
}
