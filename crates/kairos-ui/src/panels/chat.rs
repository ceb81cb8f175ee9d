//! Chat panel: consultation transcript, input line, session buttons.

use egui::{self, Align, Color32, Layout, RichText, ScrollArea, Vec2};
use kairos_types::message::{ChatMessage, Role};

use crate::action::{DictationTarget, UiAction};
use crate::panels::mic_button;
use crate::state::UiState;
use crate::theme::*;

/// Render the chat panel. Returns an action when the user sends or presses a button.
pub fn chat_panel(ui: &mut egui::Ui, state: &mut UiState) -> Option<UiAction> {
    let mut action = None;

    egui::Frame::default()
        .fill(BG_PRIMARY)
        .inner_margin(PANEL_PADDING)
        .show(ui, |ui| {
            ui.vertical(|ui| {
                // Header
                ui.horizontal(|ui| {
                    ui.vertical(|ui| {
                        ui.label(RichText::new(&state.patient_name).color(TEXT_PRIMARY).strong());
                        ui.label(RichText::new(&state.dni_label).color(TEXT_SECONDARY).small());
                    });
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if ui
                            .add_enabled(!state.busy, egui::Button::new("Finalizar consulta"))
                            .clicked()
                        {
                            action = Some(UiAction::Finalize);
                        }
                        if state.diagnosis_ready {
                            if ui
                                .add_enabled(!state.busy, egui::Button::new("🖨 Imprimir receta"))
                                .clicked()
                            {
                                action = Some(UiAction::PrintReceipt);
                            }
                        } else if ui
                            .add_enabled(!state.busy, egui::Button::new("Ver diagnóstico"))
                            .clicked()
                        {
                            action = Some(UiAction::GenerateDiagnosis);
                        }
                    });
                });

                ui.separator();

                // Messages area
                let available_height = ui.available_height() - 80.0;
                ScrollArea::vertical()
                    .max_height(available_height)
                    .auto_shrink([false, false])
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for message in &state.messages {
                            render_message(ui, message);
                            ui.add_space(6.0);
                        }

                        if state.typing {
                            ui.label(
                                RichText::new("Escribiendo...")
                                    .color(TEXT_SECONDARY)
                                    .italics(),
                            );
                        }
                    });

                ui.add_space(8.0);

                // Input area
                ui.horizontal(|ui| {
                    let listening = state.dictating == Some(DictationTarget::Message);
                    if mic_button(ui, state, listening) {
                        action = Some(UiAction::Dictate(DictationTarget::Message));
                    }

                    let input = egui::TextEdit::singleline(&mut state.message_input)
                        .hint_text("Cuéntame qué sientes...")
                        .desired_width(ui.available_width() - 120.0);

                    let response = ui.add(input);

                    let send_enabled = !state.message_input.trim().is_empty() && !state.busy;
                    let send_btn = ui.add_enabled(
                        send_enabled,
                        egui::Button::new(RichText::new("Enviar").color(ACCENT_TEXT))
                            .fill(if send_enabled { ACCENT } else { BG_SURFACE })
                            .corner_radius(PANEL_ROUNDING)
                            .min_size(Vec2::new(100.0, 40.0)),
                    );

                    // Submit on Enter or button click
                    if (response.lost_focus()
                        && ui.input(|i| i.key_pressed(egui::Key::Enter))
                        && send_enabled)
                        || send_btn.clicked()
                    {
                        let text = state.message_input.trim().to_string();
                        action = Some(UiAction::SendMessage(text));
                        state.message_input.clear();
                        response.request_focus();
                    }
                });
            });
        });

    action
}

fn render_message(ui: &mut egui::Ui, message: &ChatMessage) {
    let (label, label_color, bg, align) = match message.role {
        Role::Patient => ("Tú", ACCENT, PATIENT_BUBBLE, Align::Max),
        Role::Assistant => ("Kairos", SUCCESS, ASSISTANT_BUBBLE, Align::Min),
    };

    ui.with_layout(Layout::top_down(align), |ui| {
        egui::Frame::default()
            .fill(bg)
            .stroke(egui::Stroke::new(1.0, Color32::from_gray(220)))
            .corner_radius(PANEL_ROUNDING)
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.set_max_width(ui.available_width() * 0.8);
                ui.label(RichText::new(label).color(label_color).strong().small());
                ui.label(RichText::new(&message.text).color(TEXT_PRIMARY));
            });
    });
}
