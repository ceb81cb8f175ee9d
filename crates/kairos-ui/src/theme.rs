//! UI theme constants

use egui::{Color32, CornerRadius, FontFamily, FontId, Stroke, TextStyle, Vec2};

pub const BG_PRIMARY: Color32 = Color32::from_rgb(244, 247, 241);
pub const BG_SECONDARY: Color32 = Color32::from_rgb(255, 255, 255);
pub const BG_SURFACE: Color32 = Color32::from_rgb(226, 235, 221);
pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(33, 43, 32);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(98, 112, 96);
pub const ACCENT: Color32 = Color32::from_rgb(46, 125, 50);
pub const ACCENT_TEXT: Color32 = Color32::WHITE;
pub const SUCCESS: Color32 = Color32::from_rgb(56, 142, 60);
pub const ERROR: Color32 = Color32::from_rgb(198, 40, 40);
pub const WARNING: Color32 = Color32::from_rgb(230, 145, 0);
pub const PATIENT_BUBBLE: Color32 = Color32::from_rgb(200, 230, 201);
pub const ASSISTANT_BUBBLE: Color32 = Color32::from_rgb(255, 255, 255);

pub const PANEL_ROUNDING: CornerRadius = CornerRadius::same(10);
pub const PANEL_PADDING: Vec2 = Vec2::new(24.0, 16.0);

/// Touch targets on the kiosk screen
pub const BUTTON_SIZE: Vec2 = Vec2::new(220.0, 56.0);

/// Apply the light kiosk theme to an egui context
pub fn apply_theme(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    style.visuals.dark_mode = false;
    style.visuals.panel_fill = BG_PRIMARY;
    style.visuals.window_fill = BG_SECONDARY;
    style.visuals.extreme_bg_color = BG_SECONDARY;
    style.visuals.override_text_color = Some(TEXT_PRIMARY);

    style.visuals.widgets.inactive.bg_fill = BG_SURFACE;
    style.visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, TEXT_SECONDARY);
    style.visuals.widgets.hovered.bg_fill = BG_SURFACE;
    style.visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    style.visuals.widgets.active.bg_fill = ACCENT;
    style.visuals.widgets.active.fg_stroke = Stroke::new(1.0, ACCENT_TEXT);

    style.visuals.selection.bg_fill = ACCENT.linear_multiply(0.4);
    style.visuals.selection.stroke = Stroke::new(1.0, ACCENT);

    // Kiosk is read from arm's length
    style.text_styles.insert(TextStyle::Body, FontId::new(20.0, FontFamily::Proportional));
    style.text_styles.insert(TextStyle::Button, FontId::new(20.0, FontFamily::Proportional));
    style.text_styles.insert(TextStyle::Heading, FontId::new(32.0, FontFamily::Proportional));
    style.text_styles.insert(TextStyle::Small, FontId::new(15.0, FontFamily::Proportional));

    style.spacing.item_spacing = Vec2::new(12.0, 10.0);
    style.spacing.button_padding = Vec2::new(16.0, 10.0);

    ctx.set_style(style);
}

/// Filled primary button
pub fn primary_button(text: &str) -> egui::Button<'static> {
    egui::Button::new(egui::RichText::new(text).color(ACCENT_TEXT).strong())
        .fill(ACCENT)
        .corner_radius(PANEL_ROUNDING)
        .min_size(BUTTON_SIZE)
}

pub fn secondary_button(text: &str) -> egui::Button<'static> {
    egui::Button::new(egui::RichText::new(text).color(TEXT_PRIMARY))
        .fill(BG_SURFACE)
        .corner_radius(PANEL_ROUNDING)
        .min_size(BUTTON_SIZE)
}
