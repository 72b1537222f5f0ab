//! Level meter UI component.
//!
//! Renders a session's peak level as a horizontal bar.

use crate::ui::Theme;
use eframe::egui;

/// Level meter component.
pub struct LevelMeter;

impl LevelMeter {
    /// Render a level meter for a 0-100 peak value.
    pub fn show(ui: &mut egui::Ui, theme: &Theme, level_pct: u8, width: f32, height: f32) {
        let (rect, _response) =
            ui.allocate_exact_size(egui::vec2(width, height), egui::Sense::hover());

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            let level = f32::from(level_pct.min(100)) / 100.0;

            painter.rect_filled(rect, 3.0, theme.meter_background);

            let level_rect =
                egui::Rect::from_min_size(rect.min, egui::vec2(width * level, height));
            painter.rect_filled(level_rect, 3.0, Self::get_level_color(theme, level));

            painter.rect_stroke(rect, 3.0, egui::Stroke::new(1.0, theme.border));
        }
    }

    /// Get the color for a level value.
    fn get_level_color(theme: &Theme, level: f32) -> egui::Color32 {
        if level > 0.9 {
            theme.error
        } else if level > 0.7 {
            theme.warning
        } else {
            theme.meter
        }
    }
}
