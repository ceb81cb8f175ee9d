//! AI usage dashboard.

use egui::{self, RichText, ScrollArea};
use kairos_core::reporting::{PeriodStats, UsageReport};

use crate::action::{AdminAction, UiAction};
use crate::admin::AdminState;
use crate::panels::{json_loader, stat_box};
use crate::theme::*;

pub fn usage_panel(ui: &mut egui::Ui, admin: &mut AdminState) -> Option<UiAction> {
    match &admin.report {
        Some(report) => report_view(ui, report),
        None => {
            ui.label(RichText::new("Sin datos de uso cargados").color(TEXT_SECONDARY));
        }
    }

    ui.add_space(12.0);
    ui.separator();
    json_loader(
        ui,
        "Cargar registro",
        "Pega la exportación JSON del registro de uso del servidor. Reemplaza el registro cargado.",
        &mut admin.usage_json,
        AdminAction::ImportUsage,
        AdminAction::ClearUsage,
    )
}

fn report_view(ui: &mut egui::Ui, report: &UsageReport) {
    ui.horizontal(|ui| {
        stats_card(ui, "Hoy", &report.today, true);
        stats_card(ui, "Este mes", &report.month, false);
        let rate = report
            .success_rate
            .map(|r| format!("{:.1}%", r))
            .unwrap_or_else(|| "-".to_string());
        stat_box(ui, "Tasa de éxito", rate, SUCCESS);
    });

    ui.add_space(8.0);
    ui.label(RichText::new("Por modelo (mes)").color(ACCENT).strong());
    egui::Grid::new("usage_by_model").striped(true).show(ui, |ui| {
        for header in ["Modelo", "Llamadas", "Tokens", "Costo"] {
            ui.label(RichText::new(header).color(TEXT_SECONDARY).small());
        }
        ui.end_row();
        for m in &report.by_model {
            ui.label(m.modelo.as_str());
            ui.label(m.calls.to_string());
            ui.label(m.tokens.to_string());
            ui.label(format!("${:.4}", m.cost));
            ui.end_row();
        }
    });

    ui.add_space(8.0);
    ui.label(RichText::new("Últimas llamadas").color(ACCENT).strong());
    ScrollArea::vertical()
        .id_salt("usage_recent")
        .max_height(240.0)
        .show(ui, |ui| {
            egui::Grid::new("usage_recent_grid").striped(true).show(ui, |ui| {
                for header in ["Fecha", "Modelo", "Síntoma", "Tokens", "ms", ""] {
                    ui.label(RichText::new(header).color(TEXT_SECONDARY).small());
                }
                ui.end_row();
                for e in &report.recent {
                    ui.label(e.fecha_consulta.format("%d/%m %H:%M").to_string());
                    ui.label(e.modelo.as_str());
                    ui.label(e.sintoma.as_deref().unwrap_or("-"));
                    ui.label(e.tokens_usados.to_string());
                    ui.label(e.tiempo_respuesta_ms.to_string());
                    if e.exitosa {
                        ui.label(RichText::new("✔").color(SUCCESS));
                    } else {
                        ui.label(RichText::new("✖").color(ERROR));
                    }
                    ui.end_row();
                }
            });
        });
}

fn stats_card(ui: &mut egui::Ui, title: &str, stats: &PeriodStats, with_latency: bool) {
    egui::Frame::default()
        .fill(BG_SECONDARY)
        .inner_margin(PANEL_PADDING)
        .corner_radius(PANEL_ROUNDING)
        .show(ui, |ui| {
            ui.label(RichText::new(title).color(TEXT_SECONDARY).small());
            ui.label(RichText::new(stats.calls.to_string()).strong().size(28.0));
            ui.label(RichText::new(format!("{} tokens · ${:.4}", stats.tokens, stats.cost)).small());
            if with_latency {
                ui.label(RichText::new(format!("{:.0} ms promedio", stats.avg_latency_ms)).small());
            }
        });
}
