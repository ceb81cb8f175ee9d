//! Product catalog admin: form, listing, sheet import and export.

use egui::{self, RichText, ScrollArea, Vec2};
use kairos_types::product::{CATEGORIES, ProductForm};

use crate::action::{AdminAction, UiAction};
use crate::admin::AdminState;
use crate::theme::*;

pub fn products_panel(ui: &mut egui::Ui, admin: &mut AdminState) -> Option<UiAction> {
    let mut action = None;

    ui.columns(2, |columns| {
        // ── Form ─────────────────────────────────────────────
        egui::Frame::default()
            .fill(BG_SECONDARY)
            .inner_margin(PANEL_PADDING)
            .corner_radius(PANEL_ROUNDING)
            .show(&mut columns[0], |ui| {
                let title = match admin.editing {
                    Some(id) => format!("Editar producto #{}", id),
                    None => "Nuevo producto".to_string(),
                };
                ui.label(RichText::new(title).color(ACCENT).strong());
                ui.add_space(4.0);

                ScrollArea::vertical()
                    .id_salt("product_form")
                    .max_height(ui.available_height() - 48.0)
                    .show(ui, |ui| product_form(ui, &mut admin.form));

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    let save = egui::Button::new(RichText::new("Guardar").color(ACCENT_TEXT).strong())
                        .fill(ACCENT)
                        .corner_radius(PANEL_ROUNDING)
                        .min_size(Vec2::new(120.0, 32.0));
                    if ui.add(save).clicked() {
                        action = Some(UiAction::Admin(AdminAction::SaveProduct));
                    }
                    if admin.editing.is_some() && ui.button("Cancelar").clicked() {
                        action = Some(UiAction::Admin(AdminAction::CancelEdit));
                    }
                });
            });

        // ── Listing ──────────────────────────────────────────
        let ui = &mut columns[1];
        ui.horizontal(|ui| {
            ui.label(
                RichText::new(format!(
                    "{} productos, {} activos",
                    admin.products.len(),
                    admin.active_count
                ))
                .color(TEXT_SECONDARY)
                .small(),
            );
            if ui.small_button("Exportar").clicked() {
                action = Some(UiAction::Admin(AdminAction::Export));
            }
        });

        ScrollArea::vertical()
            .id_salt("product_list")
            .max_height(ui.available_height() * 0.6)
            .show(ui, |ui| {
                egui::Grid::new("products_grid")
                    .striped(true)
                    .num_columns(5)
                    .show(ui, |ui| {
                        for header in ["Código", "Nombre", "Precio", "Activo", ""] {
                            ui.label(RichText::new(header).color(TEXT_SECONDARY).small());
                        }
                        ui.end_row();

                        for p in &admin.products {
                            ui.label(RichText::new(&p.codigo_producto).monospace().small());
                            ui.label(p.nombre.as_str());
                            ui.label(format!("S/ {:.2}", p.precio));
                            ui.label(if p.activo { "Sí" } else { "No" });
                            ui.horizontal(|ui| {
                                if ui.small_button("Editar").clicked() {
                                    action = Some(UiAction::Admin(AdminAction::EditProduct(p.id)));
                                }
                                if ui.small_button("Eliminar").clicked() {
                                    action = Some(UiAction::Admin(AdminAction::DeleteProduct(p.id)));
                                }
                            });
                            ui.end_row();
                        }
                    });
            });

        ui.separator();
        ui.label(RichText::new("Importar hoja").color(ACCENT).strong());
        ui.label(
            RichText::new("Pega las filas copiadas de la hoja de cálculo (separadas por tabulador)")
                .color(TEXT_SECONDARY)
                .small(),
        );
        ui.add(
            egui::TextEdit::multiline(&mut admin.sheet_text)
                .desired_rows(4)
                .desired_width(f32::INFINITY)
                .code_editor(),
        );
        if ui
            .add_enabled(!admin.sheet_text.trim().is_empty(), egui::Button::new("Importar"))
            .clicked()
        {
            action = Some(UiAction::Admin(AdminAction::ImportSheet));
        }
    });

    action
}

fn product_form(ui: &mut egui::Ui, form: &mut ProductForm) {
    text_field(ui, "Nombre *", &mut form.nombre);

    ui.label(RichText::new("Categoría *").color(TEXT_SECONDARY).small());
    let selected = CATEGORIES
        .iter()
        .find(|(key, _)| *key == form.categoria)
        .map(|(_, label)| *label)
        .unwrap_or("Selecciona...");
    egui::ComboBox::from_id_salt("product_category")
        .selected_text(selected)
        .show_ui(ui, |ui| {
            for (key, label) in CATEGORIES {
                ui.selectable_value(&mut form.categoria, key.to_string(), *label);
            }
        });

    ui.label(RichText::new("Código (vacío = automático)").color(TEXT_SECONDARY).small());
    ui.text_edit_singleline(&mut form.codigo_producto);

    text_field(ui, "Precio *", &mut form.precio);
    text_field(ui, "Presentación", &mut form.presentacion);
    text_area(ui, "Descripción corta", &mut form.descripcion_corta);
    text_area(ui, "Para qué sirve", &mut form.para_que_sirve);
    text_area(ui, "Beneficios", &mut form.beneficios);
    text_area(ui, "Dosis recomendada", &mut form.dosis);
    text_area(ui, "Síntomas que trata", &mut form.sintomas_que_trata);

    ui.checkbox(&mut form.activo, "Activo");
}

fn text_field(ui: &mut egui::Ui, label: &str, value: &mut String) {
    ui.label(RichText::new(label).color(TEXT_SECONDARY).small());
    ui.add(egui::TextEdit::singleline(value).desired_width(f32::INFINITY));
}

fn text_area(ui: &mut egui::Ui, label: &str, value: &mut String) {
    ui.label(RichText::new(label).color(TEXT_SECONDARY).small());
    ui.add(
        egui::TextEdit::multiline(value)
            .desired_rows(2)
            .desired_width(f32::INFINITY),
    );
}
