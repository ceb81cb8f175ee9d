//! Admin landing page: headline counters, last seven days, latest consultations.

use egui::{self, RichText};
use kairos_core::dashboard::Dashboard;

use crate::action::{AdminAction, UiAction};
use crate::admin::AdminState;
use crate::panels::stat_box;
use crate::theme::*;

pub fn dashboard_panel(ui: &mut egui::Ui, admin: &AdminState) -> Option<UiAction> {
    let Some(dash) = &admin.dashboard else {
        ui.label(RichText::new("Cargando...").color(TEXT_SECONDARY));
        return None;
    };

    ui.horizontal(|ui| {
        stat_box(ui, "Consultas totales", dash.total_consultas.to_string(), ACCENT);
        stat_box(ui, "Consultas hoy", dash.consultas_hoy.to_string(), SUCCESS);
        stat_box(ui, "Patrones aprendidos", dash.total_patrones.to_string(), WARNING);
        stat_box(ui, "Productos activos", dash.productos_activos.to_string(), TEXT_PRIMARY);
    });

    ui.add_space(12.0);
    ui.columns(2, |columns| {
        week_chart(&mut columns[0], dash);
        latest(&mut columns[1], dash)
    })
}

fn week_chart(ui: &mut egui::Ui, dash: &Dashboard) {
    ui.label(RichText::new("Consultas de los últimos 7 días").color(ACCENT).strong());
    let peak = dash.week_peak() as f32;
    for (day, count) in &dash.semana {
        ui.horizontal(|ui| {
            ui.label(RichText::new(day.format("%d/%m").to_string()).small().monospace());
            ui.add(
                egui::ProgressBar::new(*count as f32 / peak)
                    .fill(ACCENT)
                    .text(count.to_string()),
            );
        });
    }
}

fn latest(ui: &mut egui::Ui, dash: &Dashboard) -> Option<UiAction> {
    let mut action = None;
    ui.label(RichText::new("Últimas consultas").color(ACCENT).strong());
    if dash.recientes.is_empty() {
        ui.label(RichText::new("Sin consultas cargadas").color(TEXT_SECONDARY).small());
        return None;
    }
    egui::Grid::new("dashboard_latest").striped(true).show(ui, |ui| {
        for header in ["Fecha", "Paciente", "Síntoma", ""] {
            ui.label(RichText::new(header).color(TEXT_SECONDARY).small());
        }
        ui.end_row();
        for c in &dash.recientes {
            ui.label(RichText::new(c.fecha.format("%d/%m/%Y %H:%M").to_string()).small());
            ui.label(c.patient_label());
            ui.label(truncate(&c.sintoma_principal, 40));
            if ui.small_button("Ver").clicked() {
                action = Some(UiAction::Admin(AdminAction::OpenConsultation(c.id)));
            }
            ui.end_row();
        }
    });
    action
}

/// First `max` characters, with an ellipsis when cut
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head.trim_end())
    }
}
