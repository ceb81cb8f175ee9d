//! Learned patterns and the GPT knowledge cache.

use egui::{self, RichText, ScrollArea};

use crate::action::{AdminAction, UiAction};
use crate::admin::{AdminState, LearningView};
use crate::panels::dashboard::truncate;
use crate::panels::{confidence_label, json_loader, stat_box};
use crate::theme::*;

pub fn learning_panel(ui: &mut egui::Ui, admin: &mut AdminState) -> Option<UiAction> {
    ui.horizontal(|ui| {
        ui.selectable_value(&mut admin.learning_view, LearningView::Patterns, "Patrones");
        ui.selectable_value(&mut admin.learning_view, LearningView::Knowledge, "Conocimientos");
    });
    ui.add_space(4.0);

    let action = match admin.learning_view {
        LearningView::Patterns => patterns_view(ui, admin),
        LearningView::Knowledge => {
            knowledge_view(ui, admin);
            None
        }
    };

    ui.separator();
    let loader = json_loader(
        ui,
        "Cargar aprendizaje",
        "Pega la exportación JSON con patrones, entrenamientos y conocimientos. Reemplaza la carga anterior.",
        &mut admin.learning_json,
        AdminAction::ImportLearning,
        AdminAction::ClearLearning,
    );
    action.or(loader)
}

fn patterns_view(ui: &mut egui::Ui, admin: &mut AdminState) -> Option<UiAction> {
    let mut action = None;
    let page = &admin.patterns;

    ui.horizontal(|ui| {
        stat_box(ui, "Patrones aprendidos", page.stats.total_patrones.to_string(), ACCENT);
        stat_box(ui, "Total observaciones", page.stats.total_veces.to_string(), SUCCESS);
        let confidence = page
            .stats
            .confianza_promedio
            .map(|c| format!("{:.0}%", c * 100.0))
            .unwrap_or_else(|| "-".to_string());
        stat_box(ui, "Confianza promedio", confidence, WARNING);
    });

    ui.horizontal(|ui| {
        ui.label(RichText::new("Intención").color(TEXT_SECONDARY).small());
        let selected = if admin.pattern_intent.is_empty() {
            "Todas".to_string()
        } else {
            admin.pattern_intent.clone()
        };
        egui::ComboBox::from_id_salt("pattern_intent")
            .selected_text(selected)
            .show_ui(ui, |ui| {
                if ui.selectable_value(&mut admin.pattern_intent, String::new(), "Todas").clicked() {
                    action = Some(UiAction::Admin(AdminAction::FilterPatterns));
                }
                for intent in &admin.patterns.intenciones {
                    if ui
                        .selectable_value(&mut admin.pattern_intent, intent.clone(), intent.as_str())
                        .clicked()
                    {
                        action = Some(UiAction::Admin(AdminAction::FilterPatterns));
                    }
                }
            });
        ui.label(
            RichText::new(format!("{} coincidencias", admin.patterns.matching))
                .color(TEXT_SECONDARY)
                .small(),
        );
    });

    let page = &admin.patterns;
    ScrollArea::vertical()
        .id_salt("pattern_rows")
        .max_height(ui.available_height() * 0.45)
        .show(ui, |ui| {
            egui::Grid::new("patterns_grid").striped(true).show(ui, |ui| {
                for header in ["Intención", "Texto de ejemplo", "Veces visto", "Confianza", "Última vez", "Origen"] {
                    ui.label(RichText::new(header).color(TEXT_SECONDARY).small());
                }
                ui.end_row();
                for p in &page.rows {
                    ui.label(RichText::new(&p.intencion_detectada).color(ACCENT));
                    ui.label(truncate(&p.texto_ejemplo, 60));
                    ui.label(p.veces_visto.to_string());
                    ui.label(confidence_label(p.confianza));
                    ui.label(
                        p.ultima_vez_visto
                            .map(|t| t.format("%d/%m/%Y %H:%M").to_string())
                            .unwrap_or_else(|| "-".to_string()),
                    );
                    ui.label(p.origen.as_deref().unwrap_or("-"));
                    ui.end_row();
                }
            });
        });

    ui.horizontal(|ui| {
        if ui.add_enabled(page.page > 1, egui::Button::new("«")).clicked() {
            action = Some(UiAction::Admin(AdminAction::PatternPage(page.page - 1)));
        }
        ui.label(format!("Página {} de {}", page.page, page.total_pages));
        if ui
            .add_enabled(page.page < page.total_pages, egui::Button::new("»"))
            .clicked()
        {
            action = Some(UiAction::Admin(AdminAction::PatternPage(page.page + 1)));
        }
    });

    ui.add_space(8.0);
    ui.label(RichText::new("Últimos entrenamientos").color(ACCENT).strong());
    if page.entrenamientos.is_empty() {
        ui.label(RichText::new("No hay entrenamientos registrados").color(TEXT_SECONDARY).small());
    } else {
        egui::Grid::new("trainings_grid").striped(true).show(ui, |ui| {
            for header in ["Fecha", "Tipo", "Muestras", "Precisión", "Duración"] {
                ui.label(RichText::new(header).color(TEXT_SECONDARY).small());
            }
            ui.end_row();
            for t in &page.entrenamientos {
                ui.label(t.fecha.format("%d/%m/%Y %H:%M").to_string());
                ui.label(t.tipo_entrenamiento.as_str());
                ui.label(t.num_muestras.to_string());
                ui.label(RichText::new(format!("{:.1}%", t.precision_alcanzada * 100.0)).color(SUCCESS));
                ui.label(format!("{}s", t.duracion_segundos));
                ui.end_row();
            }
        });
    }

    action
}

fn knowledge_view(ui: &mut egui::Ui, admin: &AdminState) {
    let view = &admin.knowledge;
    ui.horizontal(|ui| {
        stat_box(ui, "Conocimientos en caché", view.total.to_string(), ACCENT);
        stat_box(ui, "Veces reutilizados", view.total_usos.to_string(), SUCCESS);
        let cost = view
            .costo_promedio
            .map(|c| format!("${:.4}", c))
            .unwrap_or_else(|| "-".to_string());
        stat_box(ui, "Costo promedio", cost, WARNING);
    });

    ScrollArea::vertical()
        .id_salt("knowledge_rows")
        .max_height(ui.available_height() * 0.6)
        .show(ui, |ui| {
            for k in &view.rows {
                let fecha = k
                    .created_at
                    .map(|t| t.format("%d/%m/%Y %H:%M").to_string())
                    .unwrap_or_default();
                let title = format!(
                    "{}  ·  {} usos  ·  ${:.4}  ·  {}",
                    truncate(&k.sintoma_consulta, 50),
                    k.veces_usado,
                    k.costo_tokens,
                    fecha
                );
                egui::CollapsingHeader::new(title)
                    .id_salt(("knowledge", k.id))
                    .show(ui, |ui| {
                        ui.label(RichText::new(&k.sintoma_consulta).strong());
                        ui.label(k.respuesta_gpt.as_str());
                    });
            }
        });
}
