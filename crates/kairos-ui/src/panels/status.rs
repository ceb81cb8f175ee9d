//! Screens with no input of their own: generating, farewell, error.

use egui::{Align, Layout, RichText};

use crate::action::UiAction;
use crate::state::UiState;
use crate::theme::*;

pub fn generando_panel(ui: &mut egui::Ui) {
    ui.with_layout(Layout::top_down(Align::Center), |ui| {
        ui.add_space(ui.available_height() * 0.3);
        ui.add(egui::Spinner::new().size(64.0).color(ACCENT));
        ui.add_space(16.0);
        ui.heading(RichText::new("Analizando tus síntomas...").color(TEXT_PRIMARY));
        ui.label(RichText::new("Esto puede tardar unos segundos").color(TEXT_SECONDARY));
    });
}

pub fn despedida_panel(ui: &mut egui::Ui, state: &UiState) {
    ui.with_layout(Layout::top_down(Align::Center), |ui| {
        ui.add_space(ui.available_height() * 0.25);
        ui.heading(
            RichText::new(format!("¡Gracias, {}!", state.farewell_name))
                .color(ACCENT)
                .strong(),
        );
        ui.label(RichText::new("Que te mejores pronto 🌿").color(TEXT_PRIMARY));
        ui.add_space(24.0);
        ui.label(
            RichText::new(format!("Volviendo al inicio en {}...", state.farewell_remaining))
                .color(TEXT_SECONDARY),
        );
    });
}

/// No automatic recovery; the user goes back to the start by hand.
pub fn error_panel(ui: &mut egui::Ui, state: &UiState) -> Option<UiAction> {
    let mut action = None;
    ui.with_layout(Layout::top_down(Align::Center), |ui| {
        ui.add_space(ui.available_height() * 0.25);
        ui.heading(RichText::new("⚠ Algo salió mal").color(ERROR).strong());
        if let Some(message) = &state.error_message {
            ui.label(RichText::new(message).color(TEXT_PRIMARY));
        }
        ui.add_space(24.0);
        if ui.add(primary_button("Volver al inicio")).clicked() {
            action = Some(UiAction::Reset);
        }
    });
    action
}
