//! Consultation history: filters, listing and the per-consultation detail.

use egui::{self, RichText, ScrollArea};
use kairos_types::history::ConsultationRecord;

use crate::action::{AdminAction, UiAction};
use crate::admin::AdminState;
use crate::panels::dashboard::truncate;
use crate::panels::{confidence_label, json_loader, stat_box};
use crate::theme::*;

pub fn history_panel(ui: &mut egui::Ui, admin: &mut AdminState) -> Option<UiAction> {
    if let Some(record) = &admin.detail {
        return detail_view(ui, record);
    }

    let mut action = None;

    ui.horizontal(|ui| {
        ui.label(RichText::new("Desde").color(TEXT_SECONDARY).small());
        ui.add(egui::TextEdit::singleline(&mut admin.history_desde).desired_width(120.0));
        ui.label(RichText::new("Hasta").color(TEXT_SECONDARY).small());
        ui.add(egui::TextEdit::singleline(&mut admin.history_hasta).desired_width(120.0));
        let search = ui.add(
            egui::TextEdit::singleline(&mut admin.history_buscar)
                .hint_text("Nombre, DNI o síntoma")
                .desired_width(220.0),
        );
        let submitted = search.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Filtrar").clicked() || submitted {
            action = Some(UiAction::Admin(AdminAction::FilterHistory));
        }
    });

    let stats = &admin.history.stats;
    ui.horizontal(|ui| {
        stat_box(ui, "Consultas", stats.total.to_string(), ACCENT);
        stat_box(ui, "Pacientes únicos", stats.pacientes_unicos.to_string(), SUCCESS);
        let confidence = stats
            .confianza_promedio
            .map(|c| format!("{:.0}%", c * 100.0))
            .unwrap_or_else(|| "-".to_string());
        stat_box(ui, "Confianza promedio", confidence, WARNING);
    });

    ui.label(
        RichText::new(format!("{} registros", admin.history.rows.len()))
            .color(TEXT_SECONDARY)
            .small(),
    );
    ScrollArea::vertical()
        .id_salt("history_rows")
        .max_height(ui.available_height() * 0.6)
        .show(ui, |ui| {
            egui::Grid::new("history_grid").striped(true).show(ui, |ui| {
                for header in ["Fecha", "Paciente", "DNI", "Edad", "Síntoma", "Diagnóstico", "Confianza", "Evento", ""] {
                    ui.label(RichText::new(header).color(TEXT_SECONDARY).small());
                }
                ui.end_row();
                for c in &admin.history.rows {
                    ui.label(RichText::new(c.fecha.format("%d/%m/%Y %H:%M").to_string()).small());
                    ui.label(c.patient_label());
                    ui.label(c.dni.as_deref().unwrap_or("-"));
                    ui.label(c.edad.map(|e| e.to_string()).unwrap_or_else(|| "-".to_string()));
                    ui.label(truncate(&c.sintoma_principal, 30));
                    ui.label(c.condicion_detectada.as_deref().unwrap_or("-"));
                    match c.confianza {
                        Some(ratio) => ui.label(confidence_label(ratio)),
                        None => ui.label("-"),
                    };
                    ui.label(c.evento.as_deref().unwrap_or("-"));
                    if ui.small_button("Ver").clicked() {
                        action = Some(UiAction::Admin(AdminAction::OpenConsultation(c.id)));
                    }
                    ui.end_row();
                }
            });
        });

    ui.separator();
    let loader = json_loader(
        ui,
        "Cargar consultas",
        "Pega la exportación JSON de consultas del servidor. Las consultas ya cargadas se actualizan por ID.",
        &mut admin.history_json,
        AdminAction::ImportHistory,
        AdminAction::ClearHistory,
    );
    action.or(loader)
}

fn detail_view(ui: &mut egui::Ui, c: &ConsultationRecord) -> Option<UiAction> {
    let mut action = None;

    ui.horizontal(|ui| {
        if ui.button("← Volver").clicked() {
            action = Some(UiAction::Admin(AdminAction::CloseConsultation));
        }
        ui.heading(RichText::new(format!("Consulta #{}", c.id)).color(TEXT_PRIMARY));
    });
    ui.add_space(8.0);

    ScrollArea::vertical().id_salt("consultation_detail").show(ui, |ui| {
        ui.columns(2, |columns| {
            section(&mut columns[0], "Paciente", |ui| {
                field(ui, "Nombre", Some(c.patient_label()));
                field(ui, "DNI", c.dni.as_deref());
                field(ui, "Edad", c.edad.map(|e| format!("{} años", e)).as_deref());
                field(ui, "Teléfono", c.telefono.as_deref());
            });
            section(&mut columns[1], "Sesión", |ui| {
                field(ui, "Fecha", Some(c.fecha.format("%d/%m/%Y %H:%M:%S").to_string().as_str()));
                field(ui, "Evento", c.evento.as_deref());
                field(ui, "Ubicación", c.ubicacion.as_deref());
                field(ui, "Dispositivo", c.dispositivo.as_deref());
                field(ui, "Duración", Some(format!("{} minutos", c.duracion_minutos.unwrap_or(0)).as_str()));
            });
        });

        section(ui, "Consulta", |ui| {
            field(ui, "Síntoma principal", Some(c.sintoma_principal.as_str()));
            field(ui, "Síntomas adicionales", c.sintomas_adicionales.as_deref());
            field(ui, "Notas", c.notas.as_deref());
        });

        if let Some(condicion) = &c.condicion_detectada {
            section(ui, "Diagnóstico", |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(condicion).strong());
                    if let Some(ratio) = c.confianza {
                        ui.label(confidence_label(ratio));
                    }
                });
                field(ui, "Causas probables", c.causas_probables.as_deref());
                field(ui, "Recomendaciones", c.recomendaciones_generales.as_deref());
                field(ui, "Alimentación", c.alimentacion_recomendada.as_deref());
                field(ui, "Hábitos", c.habitos_sugeridos.as_deref());
            });
        }

        if !c.productos.is_empty() {
            section(ui, "Productos recomendados", |ui| {
                egui::Grid::new("detail_products").striped(true).show(ui, |ui| {
                    for header in ["Producto", "Precio", "Dosis", "Duración"] {
                        ui.label(RichText::new(header).color(TEXT_SECONDARY).small());
                    }
                    ui.end_row();
                    for p in &c.productos {
                        ui.label(p.nombre.as_str());
                        ui.label(format!("S/ {:.2}", p.precio));
                        ui.label(p.dosis_personalizada.as_deref().unwrap_or("-"));
                        ui.label(p.duracion_tratamiento.as_deref().unwrap_or("-"));
                        ui.end_row();
                    }
                });
            });
        }
    });

    action
}

fn section(ui: &mut egui::Ui, title: &str, body: impl FnOnce(&mut egui::Ui)) {
    egui::Frame::default()
        .fill(BG_SECONDARY)
        .inner_margin(PANEL_PADDING)
        .corner_radius(PANEL_ROUNDING)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(title).color(ACCENT).strong());
            body(ui);
        });
    ui.add_space(8.0);
}

/// Label and value; empty values are skipped
fn field(ui: &mut egui::Ui, label: &str, value: Option<&str>) {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return;
    };
    ui.label(RichText::new(label).color(TEXT_SECONDARY).small());
    ui.label(value);
}
