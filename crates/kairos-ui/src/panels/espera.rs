use egui::{Align, Layout, RichText};

use crate::action::UiAction;
use crate::state::UiState;
use crate::theme::*;

/// Idle screen: welcome, start button, today's counter.
pub fn espera_panel(ui: &mut egui::Ui, state: &UiState) -> Option<UiAction> {
    let mut action = None;

    ui.with_layout(Layout::top_down(Align::Center), |ui| {
        ui.add_space(ui.available_height() * 0.2);
        ui.heading(RichText::new("🌿 Kairos").color(ACCENT).size(56.0).strong());
        ui.label(RichText::new("Consultorio de medicina natural").color(TEXT_SECONDARY));
        if let Some(banner) = &state.event_banner {
            ui.label(RichText::new(banner).color(ACCENT).strong());
        }
        ui.add_space(32.0);

        if ui.add_enabled(!state.busy, primary_button("Iniciar consulta")).clicked() {
            action = Some(UiAction::Start);
        }

        ui.add_space(24.0);
        if let Some(total) = state.total_consultas {
            ui.label(
                RichText::new(format!("Consultas de hoy: {}", total))
                    .color(TEXT_SECONDARY)
                    .small(),
            );
        }
    });

    ui.with_layout(Layout::bottom_up(Align::RIGHT), |ui| {
        ui.horizontal(|ui| {
            if ui.small_button("Administración").clicked() {
                action = Some(UiAction::OpenAdmin);
            }
            if state.voice_available {
                let label = if state.voice_enabled { "🔊 Voz" } else { "🔇 Voz" };
                if ui.small_button(label).clicked() {
                    action = Some(UiAction::ToggleVoice);
                }
            }
        });
    });

    action
}
