use egui::{Align, Layout, RichText};

use crate::action::{DictationTarget, UiAction};
use crate::panels::mic_button;
use crate::state::UiState;
use crate::theme::*;

/// Identity capture: name, DNI, optional age.
pub fn datos_panel(ui: &mut egui::Ui, state: &mut UiState) -> Option<UiAction> {
    let mut action = None;

    ui.with_layout(Layout::top_down(Align::Center), |ui| {
        ui.add_space(32.0);
        ui.heading(RichText::new("Tus datos").color(TEXT_PRIMARY).strong());
        ui.label(RichText::new("Necesitamos algunos datos antes de empezar").color(TEXT_SECONDARY));
        ui.add_space(16.0);

        egui::Frame::default()
            .fill(BG_SECONDARY)
            .corner_radius(PANEL_ROUNDING)
            .inner_margin(PANEL_PADDING)
            .show(ui, |ui| {
                ui.set_max_width(520.0);
                field(ui, state, "Nombre completo", "Juan Pérez López", DictationTarget::Nombre, &mut action);
                field(ui, state, "DNI", "12345678", DictationTarget::Dni, &mut action);
                field(ui, state, "Edad (opcional)", "34", DictationTarget::Edad, &mut action);

                if !state.validation.is_empty() {
                    ui.add_space(8.0);
                    for message in &state.validation {
                        ui.label(RichText::new(format!("• {}", message)).color(ERROR));
                    }
                }
            });

        ui.add_space(16.0);
        ui.horizontal(|ui| {
            if ui.add_enabled(!state.busy, secondary_button("Cancelar")).clicked() {
                action = Some(UiAction::Finalize);
            }
            if ui.add_enabled(!state.busy, primary_button("Continuar")).clicked() {
                action = Some(UiAction::CaptureIdentity {
                    nombre: state.nombre_input.clone(),
                    dni: state.dni_input.clone(),
                    edad: state.edad_input.clone(),
                });
            }
        });
        if state.busy {
            ui.spinner();
        }
    });

    action
}

fn field(
    ui: &mut egui::Ui,
    state: &mut UiState,
    label: &str,
    hint: &str,
    target: DictationTarget,
    action: &mut Option<UiAction>,
) {
    ui.label(RichText::new(label).color(TEXT_SECONDARY).small());
    ui.horizontal(|ui| {
        let listening = state.dictating == Some(target);
        if mic_button(ui, state, listening) {
            *action = Some(UiAction::Dictate(target));
        }
        let value = match target {
            DictationTarget::Nombre => &mut state.nombre_input,
            DictationTarget::Dni => &mut state.dni_input,
            DictationTarget::Edad => &mut state.edad_input,
            DictationTarget::Message => &mut state.message_input,
        };
        ui.add(
            egui::TextEdit::singleline(value)
                .hint_text(hint)
                .desired_width(f32::INFINITY),
        );
    });
    ui.add_space(6.0);
}
