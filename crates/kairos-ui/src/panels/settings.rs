//! AI and general configuration forms, plus the backend server section.

use egui::{self, RichText};
use kairos_types::settings::AI_MODELS;

use crate::action::{AdminAction, UiAction};
use crate::admin::{AdminState, BackendStatus};
use crate::theme::*;

pub fn settings_panel(ui: &mut egui::Ui, admin: &mut AdminState) -> Option<UiAction> {
    let mut action = None;

    egui::ScrollArea::vertical().id_salt("settings").show(ui, |ui| {
        card(ui, "Inteligencia artificial", |ui| {
            let form = &mut admin.ai_form;
            egui::Grid::new("ai_form").num_columns(2).spacing([16.0, 8.0]).show(ui, |ui| {
                ui.label("API key de OpenAI");
                ui.add(
                    egui::TextEdit::singleline(&mut form.api_key)
                        .password(true)
                        .hint_text("sk-...")
                        .desired_width(320.0),
                );
                ui.end_row();

                ui.label("Modelo");
                let selected = AI_MODELS
                    .iter()
                    .find(|(value, _)| *value == form.modelo)
                    .map(|(_, label)| *label)
                    .unwrap_or(form.modelo.as_str())
                    .to_string();
                egui::ComboBox::from_id_salt("ai_model")
                    .selected_text(selected)
                    .width(320.0)
                    .show_ui(ui, |ui| {
                        for (value, label) in AI_MODELS {
                            ui.selectable_value(&mut form.modelo, value.to_string(), *label);
                        }
                    });
                ui.end_row();

                ui.label("Temperatura");
                ui.add(egui::Slider::new(&mut form.temperatura, 0.0..=1.0).step_by(0.1));
                ui.end_row();

                ui.label("Máximo de tokens");
                ui.add(egui::DragValue::new(&mut form.max_tokens).range(1..=16000));
                ui.end_row();

                ui.label("Consultas por día");
                ui.add(egui::DragValue::new(&mut form.consultas_por_dia).range(1..=100000));
                ui.end_row();

                ui.label("Costo máximo diario (USD)");
                ui.add(
                    egui::DragValue::new(&mut form.costo_maximo_dia)
                        .range(0.0..=1000.0)
                        .speed(0.5)
                        .prefix("$"),
                );
                ui.end_row();
            });
            ui.checkbox(&mut form.activo, "Usar GPT cuando el motor local no tenga respuesta");
            ui.add_space(4.0);
            if ui.button("Guardar configuración de IA").clicked() {
                action = Some(UiAction::Admin(AdminAction::SaveAiSettings));
            }
        });

        card(ui, "General", |ui| {
            let form = &mut admin.general_form;
            egui::Grid::new("general_form").num_columns(2).spacing([16.0, 8.0]).show(ui, |ui| {
                ui.label("Nombre del evento");
                ui.add(egui::TextEdit::singleline(&mut form.evento_nombre).desired_width(320.0));
                ui.end_row();
                ui.label("Ubicación");
                ui.add(egui::TextEdit::singleline(&mut form.ubicacion).desired_width(320.0));
                ui.end_row();
            });
            ui.checkbox(&mut form.voz_activa, "Voz activada al iniciar");
            ui.checkbox(&mut form.modo_offline, "Modo sin conexión");
            ui.add_space(4.0);
            if ui.button("Guardar configuración general").clicked() {
                action = Some(UiAction::Admin(AdminAction::SaveGeneralSettings));
            }
        });

        card(ui, "Servidor", |ui| {
            match &admin.backend {
                BackendStatus::Unknown => {
                    ui.label(RichText::new("Estado sin verificar").color(TEXT_SECONDARY));
                }
                BackendStatus::Offline => {
                    ui.label(RichText::new("● Sin conexión").color(ERROR));
                }
                BackendStatus::Online(info) => {
                    ui.label(
                        RichText::new(format!(
                            "● En línea: {}",
                            info.sistema.as_deref().unwrap_or("servidor")
                        ))
                        .color(SUCCESS),
                    );
                    let gpt = if info.gpt_activo { "activo" } else { "inactivo" };
                    ui.label(format!("GPT {} · {} sesiones activas", gpt, info.sesiones_activas));
                }
            }
            if ui.button("Verificar").clicked() {
                action = Some(UiAction::Admin(AdminAction::CheckBackend));
            }

            ui.add_space(8.0);
            ui.label(RichText::new("URL del servidor").color(TEXT_SECONDARY).small());
            ui.add(
                egui::TextEdit::singleline(&mut admin.backend_url)
                    .hint_text("https://servidor.ejemplo/api")
                    .desired_width(420.0),
            );
            ui.label(
                RichText::new("Guardar o restablecer recarga el kiosko.")
                    .color(TEXT_SECONDARY)
                    .small(),
            );
            ui.horizontal(|ui| {
                if ui.button("Guardar URL").clicked() {
                    action = Some(UiAction::Admin(AdminAction::SaveBackendUrl));
                }
                if ui.button("Restablecer").clicked() {
                    action = Some(UiAction::Admin(AdminAction::ClearBackendUrl));
                }
            });
        });
    });

    action
}

fn card(ui: &mut egui::Ui, title: &str, body: impl FnOnce(&mut egui::Ui)) {
    egui::Frame::default()
        .fill(BG_SECONDARY)
        .inner_margin(PANEL_PADDING)
        .corner_radius(PANEL_ROUNDING)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(title).color(ACCENT).strong().size(18.0));
            ui.add_space(6.0);
            body(ui);
        });
    ui.add_space(12.0);
}
